//! Clip sampler CLI tool
//!
//! Inspects and sweeps UCF-101 / HMDB-51 frame datasets using the clip-sampler
//! library.

use clip_sampler::cli;

fn main() -> anyhow::Result<()> {
    cli::main()
}
