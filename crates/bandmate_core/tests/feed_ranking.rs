use bandmate_core::{match_score, rank, Post, UserProfile};

fn profile(genres: &[&str], roles: &[&str], skills: &[&str]) -> UserProfile {
    let mut user = UserProfile::new("Ari");
    user.genres = genres.iter().map(|value| value.to_string()).collect();
    user.roles = roles.iter().map(|value| value.to_string()).collect();
    user.skills = skills.iter().map(|value| value.to_string()).collect();
    user
}

fn post(genre: &str, roles: &[&str], tags: &[&str], created_at: i64) -> Post {
    let mut post = Post::new(genre, created_at);
    post.roles_needed = roles.iter().map(|value| value.to_string()).collect();
    post.tags = tags.iter().map(|value| value.to_string()).collect();
    post
}

fn mixed_feed() -> Vec<Post> {
    vec![
        post("lofi", &["producer"], &["mixing", "mastering"], 500),
        post("jazz", &["drummer"], &["swing"], 900),
        post("lofi", &[], &[], 700),
        post("lofi", &[], &[], 700),
        post("house", &["producer"], &["mixing"], 100),
        post("lofi", &["producer"], &["mixing"], 50),
        post("", &[], &[], 0),
    ]
}

#[test]
fn documented_example_scores_point_nine() {
    let user = profile(&["lofi"], &["producer"], &["mixing"]);
    let candidate = post("lofi", &["producer"], &["mixing", "mastering"], 0);

    let ranked = rank(&user, &[candidate]);
    assert_eq!(ranked.len(), 1);
    assert!((ranked[0].score - 0.9).abs() < 1e-9);
}

#[test]
fn every_score_is_within_unit_interval() {
    let users = [
        profile(&[], &[], &[]),
        profile(&["lofi"], &["producer"], &["mixing"]),
        profile(
            &["lofi", "jazz", "house"],
            &["producer", "drummer"],
            &["mixing", "swing", "mastering"],
        ),
    ];

    for user in &users {
        for item in rank(user, &mixed_feed()) {
            assert!(
                (0.0..=1.0).contains(&item.score),
                "score {} out of range",
                item.score
            );
            assert_eq!(item.score, match_score(user, &item.post));
        }
    }
}

#[test]
fn ranking_is_idempotent() {
    let user = profile(&["lofi"], &["producer"], &["mixing"]);
    let first = rank(&user, &mixed_feed());
    let reranked_input = first.iter().map(|item| item.post.clone()).collect::<Vec<_>>();
    let second = rank(&user, &reranked_input);

    assert_eq!(first, second);
}

#[test]
fn equal_scores_prefer_newer_posts() {
    let user = profile(&["lofi"], &[], &[]);
    let older = post("lofi", &[], &[], 1_000);
    let newer = post("lofi", &[], &[], 2_000);

    let ranked = rank(&user, &[older.clone(), newer.clone()]);
    assert_eq!(ranked[0].post.id, newer.id);
    assert_eq!(ranked[1].post.id, older.id);
}

#[test]
fn equal_score_and_timestamp_keep_input_order() {
    let user = profile(&["lofi"], &[], &[]);
    let first = post("lofi", &[], &[], 1_000);
    let second = post("lofi", &[], &[], 1_000);
    let third = post("lofi", &[], &[], 1_000);

    let ranked = rank(&user, &[first.clone(), second.clone(), third.clone()]);
    let ids = ranked.iter().map(|item| item.post.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![first.id, second.id, third.id]);

    let ranked = rank(&user, &[third.clone(), first.clone(), second.clone()]);
    let ids = ranked.iter().map(|item| item.post.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![third.id, first.id, second.id]);
}

#[test]
fn absent_collections_decode_as_empty_and_score_zero() {
    let user: UserProfile = serde_json::from_value(serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555"
    }))
    .unwrap();
    let candidate: Post = serde_json::from_value(serde_json::json!({
        "id": "21111111-2222-4333-8444-555555555555",
        "genre": "lofi",
        "created_at": 10
    }))
    .unwrap();

    assert_eq!(match_score(&user, &candidate), 0.0);
}
