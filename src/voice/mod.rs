//! Voice audio handling
//!
//! Recording happens in the browser; this module turns uploaded PCM or WAV
//! payloads into clips and writes them out as WAV files for the upstream.

mod clip;

pub use clip::AudioClip;
