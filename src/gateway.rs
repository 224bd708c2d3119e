pub mod events;
pub mod factory;
pub mod logs;
pub mod lsd;

#[derive(Debug, PartialEq)]
pub(crate) enum GatewayPublisherVia {
    Logs,
}
