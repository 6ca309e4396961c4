//! HTTP API definitions.

pub mod search;

use crate::define_error;

define_error! {
    enum UpstreamError {
        #[code = "UPSTREAM_UNAVAILABLE"]
        #[status = BAD_GATEWAY]
        #[message = "Users dataset is unavailable, retry later"]
        Unavailable,
    }
}
