//! End-to-end behavior of the lease core through its public API.

use std::thread;

use lease_core::config::LeaseConfig;
use lease_core::core::listings::NewListing;
use lease_core::core::{CoreContext, ErrorKind, LeaseServices};
use lease_core::store::Database;
use tempfile::TempDir;

fn in_memory() -> LeaseServices {
    let db = Database::open_in_memory().unwrap();
    db.init_schema().unwrap();
    LeaseServices::new(CoreContext::new(LeaseConfig::new(":memory:", "ucla.edu")), db)
}

fn register(services: &LeaseServices, name: &str) -> String {
    let email = format!("{}@ucla.edu", name.to_lowercase());
    services
        .users()
        .register(name, &email, "$argon2id$v=19$stub")
        .unwrap()
        .user_id
}

fn post_listing(services: &LeaseServices, owner: &str) -> String {
    services
        .listings()
        .create(
            owner,
            &NewListing {
                title: "Sunny one bedroom on Kelton".to_string(),
                description: "Hardwood floors, walk to campus in five minutes".to_string(),
                price: 2150.0,
                address: "612 Kelton Ave".to_string(),
                zip_code: "90024".to_string(),
                country: "USA".to_string(),
                bedrooms: 1,
                distance_from_campus: 0.4,
                lease_duration: "12 months".to_string(),
                images: vec!["https://img.example/kelton-1.jpg".to_string()],
                availability: None,
            },
        )
        .unwrap()
        .listing_id
}

fn aggregate(services: &LeaseServices, listing_id: &str) -> (f64, i64) {
    let listing = services.listings().get(listing_id).unwrap();
    (listing.average_rating, listing.review_count)
}

fn assert_aggregate(services: &LeaseServices, listing_id: &str, average: f64, count: i64) {
    let (actual_average, actual_count) = aggregate(services, listing_id);
    assert_eq!(actual_count, count);
    assert!(
        (actual_average - average).abs() < 1e-9,
        "expected average {average}, got {actual_average}"
    );
}

#[test]
fn review_lifecycle_keeps_aggregate_in_step() {
    let services = in_memory();
    let owner = register(&services, "Olive");
    let bea = register(&services, "Bea");
    let cal = register(&services, "Cal");
    let listing = post_listing(&services, &owner);

    assert_aggregate(&services, &listing, 0.0, 0);

    let bea_review = services
        .reviews()
        .create(&listing, &bea, 4, "Decent place overall")
        .unwrap();
    assert_aggregate(&services, &listing, 4.0, 1);

    services
        .reviews()
        .create(&listing, &cal, 5, "Wonderful experience here")
        .unwrap();
    assert_aggregate(&services, &listing, 4.5, 2);

    services
        .reviews()
        .update(&bea_review.review_id, &bea, Some(2), None)
        .unwrap();
    assert_aggregate(&services, &listing, 3.5, 2);

    services
        .reviews()
        .delete(&bea_review.review_id, &bea)
        .unwrap();
    assert_aggregate(&services, &listing, 5.0, 1);
}

#[test]
fn owner_cannot_review_own_listing() {
    let services = in_memory();
    let owner = register(&services, "Olive");
    let listing = post_listing(&services, &owner);

    let err = services
        .reviews()
        .create(&listing, &owner, 5, "Best place I have ever owned")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(services.reviews().list_for_listing(&listing).unwrap().is_empty());
}

#[test]
fn duplicate_review_conflicts() {
    let services = in_memory();
    let owner = register(&services, "Olive");
    let bea = register(&services, "Bea");
    let listing = post_listing(&services, &owner);

    services
        .reviews()
        .create(&listing, &bea, 4, "Decent place overall")
        .unwrap();
    let err = services
        .reviews()
        .create(&listing, &bea, 2, "Second thoughts on this")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_aggregate(&services, &listing, 4.0, 1);
}

#[test]
fn create_update_delete_round_trip_restores_aggregate() {
    let services = in_memory();
    let owner = register(&services, "Olive");
    let bea = register(&services, "Bea");
    let cal = register(&services, "Cal");
    let listing = post_listing(&services, &owner);

    services
        .reviews()
        .create(&listing, &cal, 2, "Thin walls, noisy street")
        .unwrap();
    let before = aggregate(&services, &listing);

    let review = services
        .reviews()
        .create(&listing, &bea, 5, "Wonderful experience here")
        .unwrap();
    services
        .reviews()
        .update(&review.review_id, &bea, Some(3), Some("It was fine, nothing more"))
        .unwrap();
    services.reviews().delete(&review.review_id, &bea).unwrap();

    assert_eq!(aggregate(&services, &listing), before);
}

#[test]
fn conversation_summary_and_mark_read() {
    let services = in_memory();
    let dana = register(&services, "Dana");
    let eli = register(&services, "Eli");
    let listing = post_listing(&services, &eli);

    for content in ["Hi, is the room open?", "Can I tour Friday?", "Also, pets ok?"] {
        services
            .messages()
            .send(&dana, &eli, content, Some(&listing))
            .unwrap();
    }
    let reply = services
        .messages()
        .send(&eli, &dana, "Yes to all three", Some(&listing))
        .unwrap();

    let summaries = services.conversations().list(&eli).unwrap();
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.partner.user_id, dana);
    assert_eq!(summary.partner.display_name.as_deref(), Some("Dana"));
    assert_eq!(summary.unread_count, 3);
    assert_eq!(summary.total_messages, 4);
    assert_eq!(summary.last_message.message_id, reply.message_id);

    let marked = services.inbox().mark_read(&eli, &dana).unwrap();
    assert_eq!(marked.modified_count, 3);
    let again = services.inbox().mark_read(&eli, &dana).unwrap();
    assert_eq!(again.modified_count, 0);

    let summaries = services.conversations().list(&eli).unwrap();
    assert_eq!(summaries[0].unread_count, 0);
    assert_eq!(services.inbox().unread_count(&dana).unwrap(), 1);

    let thread = services.conversations().get_conversation(&dana, &eli).unwrap();
    assert_eq!(thread.len(), 4);
    assert_eq!(thread[0].content, "Hi, is the room open?");
    assert_eq!(thread[3].message_id, reply.message_id);
}

#[test]
fn messaging_yourself_is_rejected_before_persistence() {
    let services = in_memory();
    let fay = register(&services, "Fay");

    let err = services
        .messages()
        .send(&fay, &fay, "reminder: pay rent", None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(services.conversations().list(&fay).unwrap().is_empty());
    assert_eq!(services.inbox().unread_count(&fay).unwrap(), 0);
}

#[test]
fn deleting_a_listing_drops_reviews_and_keeps_messages() {
    let services = in_memory();
    let owner = register(&services, "Olive");
    let bea = register(&services, "Bea");
    let listing = post_listing(&services, &owner);

    let review = services
        .reviews()
        .create(&listing, &bea, 4, "Decent place overall")
        .unwrap();
    let message = services
        .messages()
        .send(&bea, &owner, "Still available?", Some(&listing))
        .unwrap();

    services.listings().delete(&listing, &owner).unwrap();

    let err = services.reviews().get(&review.review_id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let message = services.messages().get(&message.message_id).unwrap();
    assert!(message.listing_id.is_none());
    assert!(message.listing_title.is_none());
}

#[test]
fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let ctx = CoreContext::new(LeaseConfig::new(dir.path().join("lease.db"), "ucla.edu"));

    let (listing, bea) = {
        let services = ctx.services().unwrap();
        let owner = register(&services, "Olive");
        let bea = register(&services, "Bea");
        let listing = post_listing(&services, &owner);
        services
            .reviews()
            .create(&listing, &bea, 3, "Fine for one school year")
            .unwrap();
        (listing, bea)
    };

    let services = ctx.services().unwrap();
    assert_aggregate(&services, &listing, 3.0, 1);
    assert!(services.reviews().get_by_author(&listing, &bea).unwrap().is_some());
}

#[test]
fn concurrent_reviews_converge_on_true_aggregate() {
    const WRITERS: usize = 8;

    let dir = TempDir::new().unwrap();
    let ctx = CoreContext::new(LeaseConfig::new(dir.path().join("lease.db"), "ucla.edu"));

    let setup = ctx.services().unwrap();
    let owner = register(&setup, "Olive");
    let listing = post_listing(&setup, &owner);
    let reviewers: Vec<String> = (0..WRITERS)
        .map(|i| register(&setup, &format!("Reviewer{i}")))
        .collect();

    // One connection per writer, opened up front.
    let workers: Vec<_> = reviewers
        .into_iter()
        .enumerate()
        .map(|(i, reviewer)| (i, reviewer, ctx.services().unwrap()))
        .collect();

    let handles: Vec<_> = workers
        .into_iter()
        .map(|(i, reviewer, services)| {
            let listing = listing.clone();
            thread::spawn(move || {
                let rating = i64::try_from(i % 5).unwrap() + 1;
                services
                    .reviews()
                    .create(&listing, &reviewer, rating, "Written under contention")
                    .unwrap();
                // The same author racing a second create must lose.
                let err = services
                    .reviews()
                    .create(&listing, &reviewer, rating, "Written under contention")
                    .unwrap_err();
                assert_eq!(err.kind(), ErrorKind::Conflict);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // ratings 1,2,3,4,5,1,2,3 -> 21 / 8 = 2.625 -> 2.6
    let services = ctx.services().unwrap();
    assert_aggregate(&services, &listing, 2.6, 8);
    assert_eq!(services.ratings().reconcile(Some(&listing)).unwrap(), 1);
    assert_aggregate(&services, &listing, 2.6, 8);
}
