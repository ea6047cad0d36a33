// Define some constants for the audio parameters
pub const SOURCE_SAMPLE_RATE: u32 = 24_000; // commentary service delivers 24 kHz mono PCM
pub const OUTPUT_SAMPLE_RATE: u32 = 48_000; // monitor stream output rate
pub const BIT_DEPTH: u16 = 16; // 16 bits per sample
pub const CHANNELS: u16 = 2; // stereo monitor output
