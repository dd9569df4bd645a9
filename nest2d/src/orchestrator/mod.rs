mod cancel;
mod nester;
mod objective;
mod pass;

#[doc(inline)]
pub use cancel::CancellationToken;
#[doc(inline)]
pub use nester::{Nester, NestingOutcome, RunStatus};
#[doc(inline)]
pub use objective::{PassObjective, fitness};
#[doc(inline)]
pub use pass::{PassContext, PassOutcome};
