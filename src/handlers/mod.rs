// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (admin bearer token) → Elevated (gateway API key)

pub mod elevated; // Tier 3: API-key principals (/api/db/*)
pub mod protected; // Tier 2: admin JWT required (video writes, contact listing, verify)
pub mod public; // Tier 1: no authentication
