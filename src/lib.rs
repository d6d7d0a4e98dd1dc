#![doc = include_str!("../README.md")]
//!
//! # Glossary
//!
//! - **PIO (Programmable I/O):** RP2040 state machines; PIO0 drives the
//!   WS2812 strip, PIO1 the I2S output.
//! - **Voice:** one of the two mixer inputs; background (hum, stingers) and
//!   effect (swing/hit) play simultaneously.
//! - **Sweep:** the progressive ignite/extinguish animation along the folded
//!   blade.
#![cfg_attr(target_os = "none", no_std)]
#![allow(async_fn_in_trait, reason = "single-threaded embedded")]

#[macro_use]
mod fmt;

pub mod audio;
pub mod blade;
pub mod clock;
pub mod color;
pub mod controller;
mod error;
pub mod gesture;
pub mod motion;
pub mod rng;
pub mod settings;

#[cfg(target_os = "none")]
pub mod i2s_mixer;
#[cfg(target_os = "none")]
pub mod lis3dh;
#[cfg(target_os = "none")]
#[doc(hidden)]
pub mod pio_irqs;
#[cfg(target_os = "none")]
pub mod strip_ws2812;

pub use crate::error::{Error, Result};
