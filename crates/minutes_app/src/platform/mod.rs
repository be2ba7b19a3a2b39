mod app;
mod effects;
mod logging;
mod render;
mod session;

pub use app::run_app;

/// Events the platform loop consumes: core messages plus loop control.
pub enum LoopEvent {
    Core(minutes_core::Msg),
    /// User asked to leave; honored unless the unload guard objects.
    Quit,
    /// User insisted on leaving despite an active job.
    ForceQuit,
}
