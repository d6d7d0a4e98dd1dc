//! Minimal LIS3DH accelerometer driver over blocking I2C.
//!
//! Only what the motion classifier needs: one-time configuration and raw
//! 3-axis reads converted to m/s².

use embedded_hal::i2c::I2c;

use crate::motion::Accelerometer;

/// Default address with the SA0 pad low.
pub const LIS3DH_ADDRESS: u8 = 0x18;

const REG_WHO_AM_I: u8 = 0x0F;
const REG_CTRL1: u8 = 0x20;
const REG_CTRL4: u8 = 0x23;
const REG_OUT_X_L: u8 = 0x28;

/// MSB set enables register auto-increment on multi-byte reads.
const AUTO_INCREMENT: u8 = 0x80;

const WHO_AM_I_EXPECTED: u8 = 0x33;

/// 100 Hz data rate, all three axes enabled.
const CTRL1_100HZ_XYZ: u8 = 0x57;

/// ±4 g full scale, high-resolution mode.
const CTRL4_4G_HIGH_RES: u8 = 0x18;

/// In high-resolution mode the 12-bit sample is left-justified;
/// one count is 2 mg at ±4 g.
const G_PER_COUNT: f32 = 0.002;
const STANDARD_GRAVITY: f32 = 9.806_65;

#[derive(Debug)]
pub enum Error<E> {
    I2c(E),
    InvalidWhoAmI(u8),
}

impl<E> From<E> for Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}

pub struct Lis3dh<I> {
    i2c: I,
    addr: u8,
}

impl<I, E> Lis3dh<I>
where
    I: I2c<Error = E>,
{
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            addr: LIS3DH_ADDRESS,
        }
    }

    pub fn new_with_addr(i2c: I, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Verifies the sensor identity and configures continuous sampling.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        let who = self.read_who_am_i()?;
        if who != WHO_AM_I_EXPECTED {
            return Err(Error::InvalidWhoAmI(who));
        }

        self.i2c.write(self.addr, &[REG_CTRL1, CTRL1_100HZ_XYZ])?;
        self.i2c.write(self.addr, &[REG_CTRL4, CTRL4_4G_HIGH_RES])?;
        Ok(())
    }

    pub fn read_who_am_i(&mut self) -> Result<u8, Error<E>> {
        let mut data = [0_u8; 1];
        self.i2c.write_read(self.addr, &[REG_WHO_AM_I], &mut data)?;
        Ok(data[0])
    }

    /// Returns (x, y, z) acceleration in m/s².
    pub fn read_acceleration(&mut self) -> Result<(f32, f32, f32), Error<E>> {
        let mut data = [0_u8; 6];
        self.i2c
            .write_read(self.addr, &[REG_OUT_X_L | AUTO_INCREMENT], &mut data)?;

        let to_mps2 = |low: u8, high: u8| {
            let raw = i16::from_le_bytes([low, high]) >> 4;
            f32::from(raw) * G_PER_COUNT * STANDARD_GRAVITY
        };
        Ok((
            to_mps2(data[0], data[1]),
            to_mps2(data[2], data[3]),
            to_mps2(data[4], data[5]),
        ))
    }
}

impl<I, E> Accelerometer for Lis3dh<I>
where
    I: I2c<Error = E>,
{
    fn read(&mut self) -> (f32, f32, f32) {
        match self.read_acceleration() {
            Ok(sample) => sample,
            // A dead sensor mid-session has no sane fallback.
            Err(_) => defmt::panic!("accelerometer read failed"),
        }
    }
}
