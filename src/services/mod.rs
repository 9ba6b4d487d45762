pub mod api_server;
pub mod delegated_signer;

#[cfg(test)]
pub(crate) mod test_support;
