use jiff::{SignedDuration, Timestamp};
use jokester_core::{NewJoke, Repository, StorageError, User, UserId};
use jokester_gateway::HeaderAuthenticator;
use tracing::{debug, info};

const USERS: &[(&str, &str)] = &[("kody", "kody"), ("sam", "sam")];

const JOKES: &[(&str, &str, &str, &str)] = &[
    (
        "road-worker",
        "Road worker",
        "kody",
        "I never wanted to believe that my Dad was stealing from his job as a road worker. But when I got home, all the signs were there.",
    ),
    (
        "frisbee",
        "Frisbee",
        "kody",
        "I was wondering why the frisbee was getting bigger, then it hit me.",
    ),
    (
        "trees",
        "Trees",
        "sam",
        "Why do trees seem suspicious on sunny days? Dunno, they're just a bit shady.",
    ),
    (
        "skeletons",
        "Skeletons",
        "sam",
        "Why don't skeletons ride roller coasters? They don't have the stomach for it.",
    ),
    (
        "hippos",
        "Hippos",
        "kody",
        "Why don't you find hippopotamuses hiding in trees? They're really good at it.",
    ),
    (
        "dinner",
        "Dinner",
        "sam",
        "What did one plate say to the other plate? Dinner is on me!",
    ),
];

/// Registers the demo users and inserts the demo jokes, skipping jokes that
/// already exist.
pub async fn seed_demo<R: Repository>(
    repository: &R,
    auth: &HeaderAuthenticator,
) -> Result<(), StorageError> {
    for (id, username) in USERS {
        let id = UserId::new(*id).map_err(|e| StorageError::InvalidArgument(e.to_string()))?;
        auth.register(User {
            id,
            username: username.to_string(),
        });
    }

    let base = Timestamp::now();
    let mut inserted = 0;
    for (i, (id, name, jokester, content)) in JOKES.iter().enumerate() {
        let jokester_id =
            UserId::new(*jokester).map_err(|e| StorageError::InvalidArgument(e.to_string()))?;
        let joke = NewJoke::builder()
            .id(*id)
            .name(*name)
            .content(*content)
            .jokester_id(jokester_id)
            .created_at(base + SignedDuration::from_secs(i as i64))
            .build();

        match repository.insert(joke).await {
            Ok(()) => inserted += 1,
            Err(StorageError::Conflict(id)) => debug!(joke_id = %id, "demo joke already present"),
            Err(err) => return Err(err),
        }
    }

    info!(users = USERS.len(), inserted, "seeded demo data");
    Ok(())
}
