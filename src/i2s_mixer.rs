//! Two-voice software mixer feeding a PIO I2S output.
//!
//! The mixer runs as its own task so DMA chunks keep flowing while the
//! control loop spins. The [`I2sMixer`] handle is cheap and synchronous:
//! commands go over a channel, playback state comes back through atomics.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_executor::Spawner;
use embassy_rp::Peri;
use embassy_rp::peripherals::{DMA_CH1, PIN_8, PIN_9, PIN_10, PIO1};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::i2s::{PioI2sOut, PioI2sOutProgram};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::Result;
use crate::audio::{AudioVoices, Clip, SAMPLE_RATE_HZ, Voice};
use crate::pio_irqs::Pio1Irqs;

const BIT_DEPTH_BITS: u32 = 16;
const SAMPLE_BUFFER_LEN: usize = 256;
const COMMAND_QUEUE_LEN: usize = 8;

enum MixerCommand {
    Play {
        voice: Voice,
        clip: Clip,
        looping: bool,
        level_q15: i32,
    },
    SetLevel {
        voice: Voice,
        level_q15: i32,
    },
}

static COMMANDS: Channel<CriticalSectionRawMutex, MixerCommand, COMMAND_QUEUE_LEN> =
    Channel::new();

// Written by the mixer task, read by the control loop. Relaxed is enough on
// a single-core executor.
static PLAYING: [AtomicBool; Voice::COUNT] = [AtomicBool::new(false), AtomicBool::new(false)];

/// Spawns the mixer task on its fixed PIO/DMA/pin resources and returns the
/// command handle.
pub fn start(
    spawner: Spawner,
    pio: Peri<'static, PIO1>,
    dma: Peri<'static, DMA_CH1>,
    data_pin: Peri<'static, PIN_8>,
    bit_clock_pin: Peri<'static, PIN_9>,
    word_select_pin: Peri<'static, PIN_10>,
) -> Result<I2sMixer> {
    spawner.spawn(mixer_task(
        pio,
        dma,
        data_pin,
        bit_clock_pin,
        word_select_pin,
    ))?;
    Ok(I2sMixer { _private: () })
}

/// Handle to the running mixer task.
pub struct I2sMixer {
    _private: (),
}

impl AudioVoices for I2sMixer {
    fn play(&mut self, voice: Voice, clip: Clip, looping: bool, level: f32) {
        let command = MixerCommand::Play {
            voice,
            clip,
            looping,
            level_q15: level_to_q15(level),
        };
        if COMMANDS.try_send(command).is_err() {
            warn!("mixer queue full, dropping play on {}", voice);
            return;
        }
        PLAYING[voice.index()].store(true, Ordering::Relaxed);
    }

    fn set_level(&mut self, voice: Voice, level: f32) {
        let command = MixerCommand::SetLevel {
            voice,
            level_q15: level_to_q15(level),
        };
        if COMMANDS.try_send(command).is_err() {
            warn!("mixer queue full, dropping level change on {}", voice);
        }
    }

    fn is_playing(&self, voice: Voice) -> bool {
        PLAYING[voice.index()].load(Ordering::Relaxed)
    }
}

fn level_to_q15(level: f32) -> i32 {
    (level.clamp(0.0, 1.0) * 32_768.0) as i32
}

#[derive(Clone, Copy)]
struct VoiceState {
    clip: Option<Clip>,
    position: usize,
    looping: bool,
    level_q15: i32,
}

impl VoiceState {
    const IDLE: Self = Self {
        clip: None,
        position: 0,
        looping: false,
        level_q15: 0,
    };

    fn is_idle(&self) -> bool {
        self.clip.is_none()
    }

    /// Next attenuated sample; silence past the end of a non-looping clip.
    fn next_sample(&mut self) -> i32 {
        let Some(clip) = self.clip else {
            return 0;
        };
        if self.position >= clip.len() {
            if self.looping && !clip.is_empty() {
                self.position = 0;
            } else {
                return 0;
            }
        }
        let sample = clip[self.position];
        self.position += 1;
        (i32::from(sample) * self.level_q15) >> 15
    }

    fn finished(&self) -> bool {
        match self.clip {
            Some(clip) => !self.looping && self.position >= clip.len(),
            None => false,
        }
    }
}

fn apply_command(voices: &mut [VoiceState; Voice::COUNT], command: MixerCommand) {
    match command {
        MixerCommand::Play {
            voice,
            clip,
            looping,
            level_q15,
        } => {
            voices[voice.index()] = VoiceState {
                clip: Some(clip),
                position: 0,
                looping,
                level_q15,
            };
        }
        MixerCommand::SetLevel { voice, level_q15 } => {
            voices[voice.index()].level_q15 = level_q15;
        }
    }
}

#[embassy_executor::task]
async fn mixer_task(
    pio: Peri<'static, PIO1>,
    dma: Peri<'static, DMA_CH1>,
    data_pin: Peri<'static, PIN_8>,
    bit_clock_pin: Peri<'static, PIN_9>,
    word_select_pin: Peri<'static, PIN_10>,
) -> ! {
    let mut pio = Pio::new(pio, Pio1Irqs);
    let program = PioI2sOutProgram::new(&mut pio.common);
    let mut i2s_out = PioI2sOut::new(
        &mut pio.common,
        pio.sm0,
        dma,
        data_pin,
        bit_clock_pin,
        word_select_pin,
        SAMPLE_RATE_HZ,
        BIT_DEPTH_BITS,
        &program,
    );
    let _program = program;

    let mut voices = [VoiceState::IDLE; Voice::COUNT];
    let mut sample_buffer = [0_u32; SAMPLE_BUFFER_LEN];

    loop {
        if voices.iter().all(VoiceState::is_idle) {
            // Nothing to mix; sleep until the next command.
            apply_command(&mut voices, COMMANDS.receive().await);
        }
        while let Ok(command) = COMMANDS.try_receive() {
            apply_command(&mut voices, command);
        }

        for slot in &mut sample_buffer {
            let mixed: i32 = voices.iter_mut().map(VoiceState::next_sample).sum();
            let sample = mixed.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
            *slot = stereo_sample(sample);
        }
        i2s_out.write(&sample_buffer).await;

        for (state, playing) in voices.iter_mut().zip(PLAYING.iter()) {
            if state.finished() {
                *state = VoiceState::IDLE;
                playing.store(false, Ordering::Relaxed);
            }
        }
    }
}

#[inline]
const fn stereo_sample(sample: i16) -> u32 {
    let sample_bits = sample as u16 as u32;
    (sample_bits << 16) | sample_bits
}
