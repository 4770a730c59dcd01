use atat::atat_derive::AtatResp;

/// Replies are parsed by the streaming engine, so commands declare no structured response
#[derive(Clone, AtatResp)]
pub struct NoResponse;
