use querykit::examples::support::MemoryTransport;
use querykit::{Client, ClientConfig, QueryConfig};

// Single test: query settings are process-wide.
#[test]
fn only_explicit_config_installs_query_settings() {
    assert!(QueryConfig::installed().warn_on_registry_miss);

    let quiet = ClientConfig::from_toml_str("[query]\nwarn_on_registry_miss = false\n").unwrap();
    let _configured = Client::with_config(MemoryTransport::new(), quiet);
    assert!(!QueryConfig::installed().warn_on_registry_miss);

    let _plain = Client::new(MemoryTransport::new());
    assert!(!QueryConfig::installed().warn_on_registry_miss);

    let _loud = Client::with_config(MemoryTransport::new(), ClientConfig::default());
    assert!(QueryConfig::installed().warn_on_registry_miss);
}
