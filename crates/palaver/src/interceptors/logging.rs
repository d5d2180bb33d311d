//! Call logging.

use std::sync::Arc;

use crate::action::SessionAction;
use crate::call::SessionCall;
use crate::channel::SessionChannel;
use crate::interceptor::{ForwardingCall, SessionInterceptor};

/// Logs every call passing through it: `debug!` at start and on success,
/// `warn!` on failure. Results are forwarded unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInterceptor;

impl SessionInterceptor for LoggingInterceptor {
    fn intercept(
        &self,
        action: Arc<dyn SessionAction>,
        next: &dyn SessionChannel,
    ) -> Box<dyn SessionCall> {
        Box::new(
            ForwardingCall::new(next.new_call(action))
                .on_call(|request| tracing::debug!(request = %request, "starting session call"))
                .map_callback(|request, callback| {
                    let summary = request.to_string();
                    Box::new(move |result| {
                        match &result {
                            Ok(_) => {
                                tracing::debug!(request = %summary, "session call succeeded");
                            }
                            Err(err) => {
                                tracing::warn!(request = %summary, error = %err, "session call failed");
                            }
                        }
                        callback(result);
                    })
                }),
        )
    }
}
