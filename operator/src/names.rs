//! Random task names for the devnet spammer.

use rand::Rng;

const ADJECTIVES: [&str; 5] = ["Quick", "Lazy", "Sleepy", "Noisy", "Hungry"];
const NOUNS: [&str; 5] = ["Fox", "Dog", "Cat", "Mouse", "Bear"];

/// Adjective, noun and a number below 1000, e.g. `SleepyBear417`.
pub fn generate_random_name(rng: &mut impl Rng) -> String {
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    let number: u16 = rng.gen_range(0..1000);
    format!("{adjective}{noun}{number}")
}
