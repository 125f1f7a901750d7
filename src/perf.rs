//! Performance instrumentation utilities
//!
//! Scopes go through the `profiling` crate; without a profiling feature they
//! compile to no-ops.

/// Profiled, timed block
/// Usage: timed!("operation name", { code })
#[macro_export]
macro_rules! timed {
    ($name:expr, $block:expr) => {{
        profiling::scope!($name);
        let _t = std::time::Instant::now();
        let r = $block;
        tracing::debug!(elapsed = ?_t.elapsed(), "{} finished", $name);
        r
    }};
}

/// Start the puffin HTTP server when built with `profile-with-puffin`.
/// The returned guard keeps it alive.
#[cfg(feature = "profile-with-puffin")]
pub fn start_profiler() -> Option<puffin_http::Server> {
    puffin::set_scopes_on(true);
    match puffin_http::Server::new("127.0.0.1:8585") {
        Ok(server) => {
            tracing::info!("puffin server listening on 127.0.0.1:8585");
            Some(server)
        }
        Err(err) => {
            tracing::warn!("failed to start puffin server: {}", err);
            None
        }
    }
}

#[cfg(not(feature = "profile-with-puffin"))]
pub fn start_profiler() -> Option<()> {
    None
}
