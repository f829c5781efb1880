use crate::reports;
use clap::Args;
use greywolf::api::VizState;
use greywolf::config::Config;
use greywolf::playback::Playback;
use greywolf::GwoResult;

#[derive(Args, Debug, Clone)]
pub struct ScrubArgs {
    #[command(flatten)]
    pub config: Config,

    /// Iteration to display; clamped to the recorded range.
    #[arg(short, long, default_value_t = 0)]
    pub iteration: usize,

    /// Steps to move after seeking; negative steps go backwards, wrapping around.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub step: i64,
}

pub fn run(args: ScrubArgs, config: Config) -> GwoResult<()> {
    let state = VizState::new();
    let result = state.generate(&config)?;

    let mut playback = Playback::new(result);
    playback.seek(args.iteration);

    for _ in 0..args.step.unsigned_abs() {
        if args.step > 0 {
            playback.step_forward();
        } else {
            playback.step_backward();
        }
    }

    reports::print_frame(&playback.current(), playback.last_index());
    Ok(())
}
