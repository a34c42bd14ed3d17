//! List the synchronized data domains.

use opsboard_domain::Domain;

/// Prints every known domain and the endpoint it is served from.
pub fn run(base_url: &str) {
    println!("Known domains:");
    for domain in Domain::ALL {
        println!("  {:<22} {}{}", domain.as_str(), base_url, domain.endpoint());
    }
}
