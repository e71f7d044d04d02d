//! Start-up pre-population with random entries

use rand::Rng;
use tracing::info;

use crate::audit::Operation;
use crate::config::SeedConfig;
use crate::db::Db;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Add `config.count` random entries, auditing each attempt as a create.
///
/// Returns how many keys were actually created; colliding keys are
/// rejected by the store like any other duplicate add.
pub fn populate(db: &Db, config: &SeedConfig) -> usize {
    let mut rng = rand::rng();
    let mut created = 0;

    for _ in 0..config.count {
        let key = random_string(&mut rng, config.key_len);
        let value = random_string(&mut rng, config.value_len);
        let ok = db.store().add(key.clone(), value);
        db.audit().record(Operation::Create, &key, ok);
        if ok {
            created += 1;
        }
    }

    info!(
        requested = config.count,
        created, "Seeded store with random entries"
    );
    created
}

fn random_string<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect()
}
