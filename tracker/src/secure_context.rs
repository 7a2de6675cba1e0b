use url::{Host, Url};

/// Whether positions may be sent to `url`. Browsers only expose geolocation
/// to secure contexts, and the broadcaster holds itself to the same rule: the
/// connection must be encrypted, or must never leave the machine.
pub fn is_secure_origin(url: &Url) -> bool {
	if matches!(url.scheme(), "https" | "wss") {
		return true;
	}

	match url.host() {
		Some(Host::Domain(domain)) => {
			let domain = domain.trim_end_matches('.').to_ascii_lowercase();
			domain == "localhost" || domain.ends_with(".localhost")
		}
		Some(Host::Ipv4(address)) => address.is_loopback(),
		Some(Host::Ipv6(address)) => address.is_loopback(),
		None => false,
	}
}
