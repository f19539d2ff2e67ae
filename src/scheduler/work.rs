use super::worker::Restrainer;
use crate::service::PinningService;
use std::any::type_name;

/// A unit of work executed by a restrainer thread.
pub(crate) trait RestraintWork: 'static + Send {
    fn do_work(self: Box<Self>, worker: &mut Restrainer, service: &'static PinningService);

    /// The name of the work packet type, for logging.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}
