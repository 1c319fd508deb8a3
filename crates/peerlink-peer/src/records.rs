//! Well-known records exchanged over the peer group.

use serde::Serialize;
use serde_json::Value;

use peerlink_core::Result;

use crate::channel::GroupChannel;
use crate::endpoint::PeerEndpoint;

impl<C: GroupChannel> PeerEndpoint<C> {
    /// Key of the group-wide client certificate record.
    pub fn global_client_cert_key(&self) -> &str {
        &self.global_client_cert_key
    }

    /// Client certificate bundle shared by the whole group.
    pub fn global_client_cert(&self) -> Result<Value> {
        self.get(&self.global_client_cert_key)
    }

    pub fn set_global_client_cert<T: Serialize + ?Sized>(&self, bundle: &T) -> Result<()> {
        self.set(&self.global_client_cert_key, bundle)
    }

    /// PKI material published for one unit, keyed by the unit's record key.
    pub fn unit_pki(&self, unit_key: &str) -> Result<Value> {
        self.get(unit_key)
    }

    pub fn set_unit_pki<T: Serialize + ?Sized>(&self, unit_key: &str, pki_data: &T) -> Result<()> {
        self.set(unit_key, pki_data)
    }
}
