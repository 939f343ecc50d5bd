//! I2C drivetrain hardware.
//!
//! `Pca9685Motors` drives the two gearbox H-bridges from a PCA9685 PWM
//! controller and `Icm42670Gyro` integrates the ICM-42670 yaw rate into a
//! heading. Both share one bus through `embedded-hal-bus` `RefCellDevice`s.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use icm42670::{Address as ImuAddress, Error as ImuError, Icm42670, PowerMode};
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};

use super::{Gyro, MotorOutput};

/// I2C address of the PWM motor controller.
pub const PWM_ADDRESS: u8 = 0x55;

const MAX_DUTY: u16 = 4095;

/// Errors that can occur when interacting with I2C-based devices.
#[derive(Debug)]
pub enum DeviceError<E: core::fmt::Debug> {
    PwmError(PwmError<E>),
    ImuError(ImuError<E>),
    ImuNotInitialized,
    PwmNotInitialized,
}

/// Clamp a motor command to `[-1, 1]`. Non-finite commands stop the side.
fn command_value(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Two-sided drivetrain on a PCA9685, one (phase, enable) channel pair per side.
pub struct Pca9685Motors<'a, I2C: 'static> {
    i2c: &'a RefCell<I2C>,
    pub pwm: Option<Pca9685<RefCellDevice<'a, I2C>>>,
    left_channels: (Channel, Channel),
    right_channels: (Channel, Channel),
    output: (f32, f32),
}

impl<'a, I2C, E> Pca9685Motors<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    pub fn new(i2c_bus: &'a RefCell<I2C>) -> Self {
        Pca9685Motors {
            i2c: i2c_bus,
            pwm: None,
            left_channels: (Channel::C0, Channel::C1),
            right_channels: (Channel::C2, Channel::C3),
            output: (0.0, 0.0),
        }
    }

    /// Create the PWM driver on the bus. Does not touch the device.
    pub fn init(&mut self) -> Result<(), DeviceError<E>> {
        let pwm = Pca9685::new(RefCellDevice::new(self.i2c), PwmAddress::from(PWM_ADDRESS))
            .map_err(DeviceError::PwmError)?;
        self.pwm = Some(pwm);
        Ok(())
    }

    /// Enable the PWM driver and set its prescale (~60Hz).
    pub fn configure(&mut self) -> Result<(), DeviceError<E>> {
        let pca = self.pwm.as_mut().ok_or(DeviceError::PwmNotInitialized)?;
        pca.enable().map_err(DeviceError::PwmError)?;
        tracing::info!("PWM enabled");
        pca.set_prescale(100).map_err(DeviceError::PwmError)?;
        tracing::info!("PWM prescale set to 60Hz");
        Ok(())
    }

    fn apply_side(
        pca: &mut Pca9685<RefCellDevice<'a, I2C>>,
        (phase, enable): (Channel, Channel),
        value: f32,
    ) -> Result<(), DeviceError<E>> {
        let value = command_value(value);
        let speed = libm::fabsf(value);
        let forward = value >= 0.0;
        pca.set_channel_on_off(phase, 0, if forward { 0 } else { MAX_DUTY })
            .map_err(DeviceError::PwmError)?;
        pca.set_channel_on_off(enable, 0, (speed * MAX_DUTY as f32) as u16)
            .map_err(DeviceError::PwmError)
    }
}

impl<'a, I2C, E> MotorOutput for Pca9685Motors<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    type Error = DeviceError<E>;

    fn drive(
        &mut self,
        left: f32,
        right: f32,
    ) -> Result<(), Self::Error> {
        let pca = self.pwm.as_mut().ok_or(DeviceError::PwmNotInitialized)?;
        Self::apply_side(pca, self.left_channels, left)?;
        Self::apply_side(pca, self.right_channels, right)?;
        self.output = (command_value(left), command_value(right));
        Ok(())
    }

    fn output_percent(&self) -> (f32, f32) {
        self.output
    }
}

/// Heading from an ICM-42670 by integrating the z-axis rate.
pub struct Icm42670Gyro<'a, I2C: 'static> {
    i2c: &'a RefCell<I2C>,
    imu: Option<Icm42670<RefCellDevice<'a, I2C>>>,
    heading: f32,
}

impl<'a, I2C, E> Icm42670Gyro<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    pub fn new(i2c_bus: &'a RefCell<I2C>) -> Self {
        Icm42670Gyro {
            i2c: i2c_bus,
            imu: None,
            heading: 0.0,
        }
    }

    /// Probe the IMU on the bus.
    pub fn init(&mut self) -> Result<(), DeviceError<E>> {
        let imu = Icm42670::new(RefCellDevice::new(self.i2c), ImuAddress::Primary)
            .map_err(DeviceError::ImuError)?;
        self.imu = Some(imu);
        Ok(())
    }

    /// Power up the gyro in low-noise mode.
    pub fn enable(&mut self) -> Result<(), DeviceError<E>> {
        let imu = self.imu.as_mut().ok_or(DeviceError::ImuNotInitialized)?;
        imu.set_power_mode(PowerMode::SixAxisLowNoise)
            .map_err(DeviceError::ImuError)
    }

    /// Yaw rate in degrees per second.
    pub fn yaw_rate(&mut self) -> Result<f32, DeviceError<E>> {
        let imu = self.imu.as_mut().ok_or(DeviceError::ImuNotInitialized)?;
        let gyro = imu.gyro_norm().map_err(DeviceError::ImuError)?;
        Ok(gyro.z)
    }
}

impl<'a, I2C, E> Gyro for Icm42670Gyro<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    type Error = DeviceError<E>;

    fn heading(&self) -> f32 {
        self.heading
    }

    fn reset(&mut self) {
        self.heading = 0.0;
    }

    fn sample(
        &mut self,
        dt: f32,
    ) -> Result<(), Self::Error> {
        let rate = self.yaw_rate()?;
        self.heading += rate * dt;
        Ok(())
    }
}
