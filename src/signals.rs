use nix::sys::signal::{self, SigHandler, Signal};

/// Interactive and terminal job-control signals.
///
/// The interpreter must survive these while children must not.
const JOB_CONTROL_SIGNALS: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

fn set_all(handler: SigHandler) -> nix::Result<()> {
    for sig in JOB_CONTROL_SIGNALS {
        // SAFETY: only SIG_IGN and SIG_DFL are installed, no Rust code runs in a handler.
        unsafe { signal::signal(sig, handler) }?;
    }
    Ok(())
}

/// Make the interpreter immune to terminal-generated signals. Called once before
/// the command loop starts.
pub fn ignore_job_control_signals() -> nix::Result<()> {
    set_all(SigHandler::SigIgn)
}

/// Give a freshly forked child the usual foreground behaviour back.
pub fn restore_default_signal_dispositions() -> nix::Result<()> {
    set_all(SigHandler::SigDfl)
}
