//! HTTP behaviour of the catalog, loan and author views

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Duration;
use serde_json::Value;

use crate::common::{
    json_body, librarian_token, location, reader_token, today, TestApp, OTHER_READER_ID,
    READER_ID,
};

fn date(value: &Value) -> String {
    value.as_str().expect("date is a string").to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_root_redirects_to_catalog() {
    let app = TestApp::new();

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/catalog/");
}

#[tokio::test]
async fn test_index_counts_and_visits() {
    let app = TestApp::new();
    app.seed_catalog().await;

    let response = app.get("/catalog/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("first visit sets the session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("sessionid="));

    let body = json_body(response).await;
    assert_eq!(body["template"], "index.html");
    let context = &body["context"];
    assert_eq!(context["num_books"], 3);
    assert_eq!(context["num_instances"], 5);
    assert_eq!(context["num_instances_available"], 2);
    assert_eq!(context["num_authors"], 2);
    assert_eq!(context["num_genres"], 4);
    assert_eq!(context["num_visits"], 0);

    let request = Request::builder()
        .uri("/catalog/")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let body = json_body(app.send(request).await).await;
    assert_eq!(body["context"]["num_visits"], 1);

    // A fresh session starts counting again
    let body = json_body(app.get("/catalog/", None).await).await;
    assert_eq!(body["context"]["num_visits"], 0);
}

#[tokio::test]
async fn test_index_on_empty_catalog() {
    let app = TestApp::new();

    let body = json_body(app.get("/catalog/", None).await).await;
    assert_eq!(body["context"]["num_books"], 0);
    assert_eq!(body["context"]["num_instances_available"], 0);
}

#[tokio::test]
async fn test_book_list_pagination() {
    let app = TestApp::new();
    for n in 0..13 {
        app.store
            .add_book(&format!("Title {:02}", n), None, "0000000000000", &[])
            .await;
    }

    let body = json_body(app.get("/catalog/books/", None).await).await;
    assert_eq!(body["template"], "catalog/book_list.html");
    let page = &body["context"];
    assert_eq!(page["object_list"].as_array().unwrap().len(), 10);
    assert_eq!(page["object_list"][0]["title"], "Title 00");
    assert_eq!(page["num_pages"], 2);
    assert_eq!(page["is_paginated"], true);
    assert_eq!(page["has_next"], true);

    let body = json_body(app.get("/catalog/books/?page=last", None).await).await;
    assert_eq!(body["context"]["page_number"], 2);
    assert_eq!(body["context"]["object_list"].as_array().unwrap().len(), 3);

    let response = app.get("/catalog/books/?page=3", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/catalog/books/?page=abc", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_list_has_one_page() {
    let app = TestApp::new();

    let response = app.get("/catalog/authors/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["context"]["num_pages"], 1);
    assert_eq!(body["context"]["is_paginated"], false);
    assert!(body["context"]["object_list"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_book_and_author_detail() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;

    let response = app.get(&format!("/catalog/book/{}", seeded.emma), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["template"], "catalog/book_detail.html");
    assert_eq!(body["context"]["book"]["title"], "Emma");
    assert_eq!(body["context"]["author"]["last_name"], "Austen");
    assert_eq!(body["context"]["genres"].as_array().unwrap().len(), 2);
    assert_eq!(body["context"]["copies"].as_array().unwrap().len(), 2);

    let body = json_body(app.get(&format!("/catalog/author/{}", seeded.austen), None).await).await;
    assert_eq!(body["template"], "catalog/author_detail.html");
    assert_eq!(body["context"]["books"].as_array().unwrap().len(), 2);

    let response = app.get("/catalog/book/999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/catalog/author/999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_my_borrowed_requires_login() {
    let app = TestApp::new();

    let response = app.get("/catalog/mybooks/", None).await;
    assert_eq!(location(&response), "/accounts/login/?next=/catalog/mybooks/");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = TestApp::new();

    let response = app.get("/catalog/mybooks/", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_my_borrowed_lists_own_loans_by_due_date() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;

    let response = app.get("/catalog/mybooks/", Some(&reader_token())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["template"], "catalog/bookinstance_list_borrowed_user.html");

    let loans = body["context"]["object_list"].as_array().unwrap();
    assert_eq!(loans.len(), 2);
    assert_eq!(loans[0]["id"], seeded.overdue.id.to_string());
    assert_eq!(loans[0]["is_overdue"], true);
    assert_eq!(loans[0]["book_title"], "The Hobbit");
    assert_eq!(loans[1]["id"], seeded.due_soon.id.to_string());
    assert_eq!(loans[1]["is_overdue"], false);
    assert!(loans.iter().all(|loan| loan["borrower_id"] == READER_ID));
}

#[tokio::test]
async fn test_all_borrowed_permission() {
    let app = TestApp::new();
    app.seed_catalog().await;

    let response = app.get("/catalog/borrowed/", None).await;
    assert_eq!(location(&response), "/accounts/login/?next=/catalog/borrowed/");

    let response = app.get("/catalog/borrowed/", Some(&reader_token())).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/catalog/borrowed/", Some(&librarian_token())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["template"], "catalog/bookinstance_list_borrowed_all.html");
    assert_eq!(body["context"]["count"], 3);
}

#[tokio::test]
async fn test_renew_form_proposes_three_weeks() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;
    let uri = format!("/catalog/book/{}/renew/", seeded.due_soon.id);

    let response = app.get(&uri, Some(&reader_token())).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get(&uri, Some(&librarian_token())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["template"], "catalog/book_renew_librarian.html");
    assert_eq!(
        date(&body["context"]["form"]["data"]["renewal_date"]),
        (today() + Duration::days(21)).format("%Y-%m-%d").to_string()
    );
    assert_eq!(body["context"]["bookinst"]["id"], seeded.due_soon.id.to_string());

    let missing = format!("/catalog/book/{}/renew/", uuid::Uuid::new_v4());
    let response = app.get(&missing, Some(&librarian_token())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_renew_valid_date_updates_due_back_only() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;
    let new_date = (today() + Duration::days(7)).format("%Y-%m-%d").to_string();

    let response = app
        .post_form(
            &format!("/catalog/book/{}/renew/", seeded.due_soon.id),
            Some(&librarian_token()),
            &format!("renewal_date={}", new_date),
        )
        .await;
    assert_eq!(location(&response), "/catalog/borrowed/");

    let body = json_body(app.get(&format!("/catalog/book/{}", seeded.emma), None).await).await;
    let copy = body["context"]["copies"]
        .as_array()
        .unwrap()
        .iter()
        .find(|copy| copy["id"] == seeded.due_soon.id.to_string())
        .cloned()
        .unwrap();
    assert_eq!(date(&copy["due_back"]), new_date);
    assert_eq!(copy["status"], "o");
    assert_eq!(copy["borrower_id"], READER_ID);
}

#[tokio::test]
async fn test_renew_invalid_dates_show_errors() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;
    let uri = format!("/catalog/book/{}/renew/", seeded.due_soon.id);
    let original_due = seeded.due_soon.due_back.unwrap().format("%Y-%m-%d").to_string();

    let cases = [
        (
            (today() - Duration::days(1)).format("%Y-%m-%d").to_string(),
            "Invalid date - renewal in past",
        ),
        (
            (today() + Duration::weeks(4) + Duration::days(1))
                .format("%Y-%m-%d")
                .to_string(),
            "Invalid date - renewal more than 4 weeks ahead",
        ),
        ("not-a-date".to_string(), "Enter a valid date."),
        (String::new(), "This field is required."),
    ];

    for (value, message) in cases {
        let response = app
            .post_form(&uri, Some(&librarian_token()), &format!("renewal_date={}", value))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["context"]["form"]["errors"]["renewal_date"][0], message);
        assert_eq!(date(&body["context"]["form"]["data"]["renewal_date"]), value);
    }

    let body = json_body(app.get("/catalog/mybooks/", Some(&reader_token())).await).await;
    let copy = body["context"]["object_list"]
        .as_array()
        .unwrap()
        .iter()
        .find(|copy| copy["id"] == seeded.due_soon.id.to_string())
        .cloned()
        .unwrap();
    assert_eq!(date(&copy["due_back"]), original_due);
}

#[tokio::test]
async fn test_renew_accepts_window_edges() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;
    let uri = format!("/catalog/book/{}/renew/", seeded.overdue.id);

    for day in [today(), today() + Duration::weeks(4)] {
        let response = app
            .post_form(
                &uri,
                Some(&librarian_token()),
                &format!("renewal_date={}", day.format("%Y-%m-%d")),
            )
            .await;
        assert_eq!(location(&response), "/catalog/borrowed/");
    }
}

#[tokio::test]
async fn test_author_create_update_delete() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;

    let body = json_body(app.get("/catalog/author/create/", None).await).await;
    assert_eq!(body["template"], "catalog/author_form.html");
    assert_eq!(body["context"]["form"]["data"]["date_of_death"], "2016-12-10");

    let response = app
        .post_form(
            "/catalog/author/create/",
            None,
            "first_name=Ursula&last_name=Le+Guin&date_of_birth=1929-10-21&date_of_death=",
        )
        .await;
    let created = location(&response);
    assert!(created.starts_with("/catalog/author/"));

    let body = json_body(app.get(&created, None).await).await;
    assert_eq!(body["context"]["author"]["last_name"], "Le Guin");
    assert_eq!(body["context"]["author"]["date_of_birth"], "1929-10-21");
    assert!(body["context"]["author"]["date_of_death"].is_null());

    let id = body["context"]["author"]["id"].as_i64().unwrap();
    let response = app
        .post_form(
            &format!("/catalog/author/{}/update/", id),
            None,
            "first_name=Ursula+K.&last_name=Le+Guin&date_of_birth=1929-10-21&date_of_death=2018-01-22",
        )
        .await;
    assert_eq!(location(&response), created);

    let body = json_body(app.get(&created, None).await).await;
    assert_eq!(body["context"]["author"]["first_name"], "Ursula K.");
    assert_eq!(body["context"]["author"]["date_of_death"], "2018-01-22");

    // Deleting an author keeps their books
    let uri = format!("/catalog/author/{}/delete/", seeded.austen);
    let body = json_body(app.get(&uri, None).await).await;
    assert_eq!(body["template"], "catalog/author_confirm_delete.html");

    let response = app.post_form(&uri, None, "").await;
    assert_eq!(location(&response), "/catalog/authors/");

    let response = app.get(&format!("/catalog/author/{}", seeded.austen), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(app.get(&format!("/catalog/book/{}", seeded.emma), None).await).await;
    assert!(body["context"]["author"].is_null());
}

#[tokio::test]
async fn test_author_form_errors() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;

    let response = app
        .post_form(
            "/catalog/author/create/",
            None,
            "first_name=&last_name=Herbert&date_of_birth=someday&date_of_death=",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let errors = &body["context"]["form"]["errors"];
    assert!(errors["first_name"].as_array().is_some());
    assert!(errors["date_of_birth"].as_array().is_some());
    assert_eq!(body["context"]["form"]["data"]["last_name"], "Herbert");

    let response = app
        .post_form(
            &format!("/catalog/author/{}/update/", seeded.tolkien),
            None,
            "first_name=John&last_name=",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["context"]["author"]["last_name"], "Tolkien");

    let response = app
        .post_form("/catalog/author/999/update/", None, "first_name=A&last_name=B")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_genre_list_and_detail() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;

    let response = app.get("/catalog/genres/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["template"], "catalog/genre_list.html");
    let names: Vec<&str> = body["context"]["object_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|genre| genre["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Classic", "Fantasy", "Poetry", "Romance"]);

    let response = app.get(&format!("/catalog/genre/{}", seeded.romance), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["template"], "catalog/genre_detail.html");
    assert_eq!(body["context"]["genre"]["name"], "Romance");
    let titles: Vec<&str> = body["context"]["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Emma", "Persuasion"]);

    let response = app.get("/catalog/genre/999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_all_borrowed_ordered_by_due_date() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;
    app.lend(seeded.emma, 1, OTHER_READER_ID).await;
    app.lend(seeded.emma, -5, OTHER_READER_ID).await;

    let body = json_body(app.get("/catalog/borrowed/", Some(&librarian_token())).await).await;
    let due_dates: Vec<String> = body["context"]["object_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|copy| date(&copy["due_back"]))
        .collect();
    assert_eq!(due_dates.len(), 5);
    assert!(due_dates.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(
        due_dates[0],
        (today() - Duration::days(5)).format("%Y-%m-%d").to_string()
    );
}

#[tokio::test]
async fn test_loan_lists_paginate() {
    let app = TestApp::new();
    let book = app.store.add_book("Middlemarch", None, "", &[]).await;
    for days in 0..12 {
        app.lend(book.id, days, READER_ID).await;
    }
    app.lend(book.id, 30, OTHER_READER_ID).await;

    let response = app.get("/catalog/mybooks/?page=2", Some(&reader_token())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let page = &body["context"];
    assert_eq!(page["count"], 12);
    assert_eq!(page["num_pages"], 2);
    assert_eq!(page["has_previous"], true);
    assert_eq!(page["has_next"], false);
    let loans = page["object_list"].as_array().unwrap();
    assert_eq!(loans.len(), 2);
    assert_eq!(
        date(&loans[1]["due_back"]),
        (today() + Duration::days(11)).format("%Y-%m-%d").to_string()
    );

    let response = app.get("/catalog/mybooks/?page=3", Some(&reader_token())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .get("/catalog/borrowed/?page=last", Some(&librarian_token()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["context"]["page_number"], 2);
    let loans = body["context"]["object_list"].as_array().unwrap();
    assert_eq!(loans.len(), 3);
    assert_eq!(loans[2]["borrower_id"], OTHER_READER_ID);

    let response = app
        .get("/catalog/borrowed/?page=3", Some(&librarian_token()))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_renew_sends_anonymous_visitors_to_login() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;
    let uri = format!("/catalog/book/{}/renew/", seeded.due_soon.id);
    let login = format!("/accounts/login/?next={}", uri);

    let response = app.get(&uri, None).await;
    assert_eq!(location(&response), login);

    let response = app.post_form(&uri, None, "renewal_date=2030-01-01").await;
    assert_eq!(location(&response), login);

    let response = app.post_empty(&uri, None).await;
    assert_eq!(location(&response), login);

    // The guard runs before the copy id is parsed
    let response = app.get("/catalog/book/not-a-uuid/renew/", None).await;
    assert_eq!(
        location(&response),
        "/accounts/login/?next=/catalog/book/not-a-uuid/renew/"
    );

    let response = app
        .get("/catalog/book/not-a-uuid/renew/", Some(&librarian_token()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(app.get("/catalog/mybooks/", Some(&reader_token())).await).await;
    let copy = body["context"]["object_list"]
        .as_array()
        .unwrap()
        .iter()
        .find(|copy| copy["id"] == seeded.due_soon.id.to_string())
        .cloned()
        .unwrap();
    assert_eq!(
        date(&copy["due_back"]),
        seeded.due_soon.due_back.unwrap().format("%Y-%m-%d").to_string()
    );
}

#[tokio::test]
async fn test_renew_without_body_shows_required_error() {
    let app = TestApp::new();
    let seeded = app.seed_catalog().await;
    let uri = format!("/catalog/book/{}/renew/", seeded.due_soon.id);

    let response = app.post_empty(&uri, Some(&librarian_token())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["template"], "catalog/book_renew_librarian.html");
    assert_eq!(
        body["context"]["form"]["errors"]["renewal_date"][0],
        "This field is required."
    );
    assert_eq!(body["context"]["bookinst"]["id"], seeded.due_soon.id.to_string());
}

#[tokio::test]
async fn test_author_create_without_body_shows_errors() {
    let app = TestApp::new();

    let response = app.post_empty("/catalog/author/create/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["template"], "catalog/author_form.html");
    assert!(body["context"]["form"]["errors"]["first_name"].is_array());
    assert!(body["context"]["form"]["errors"]["last_name"].is_array());

    let body = json_body(app.get("/catalog/authors/", None).await).await;
    assert_eq!(body["context"]["count"], 0);
}

#[tokio::test]
async fn test_missing_author_is_not_found_at_every_step() {
    let app = TestApp::new();
    app.seed_catalog().await;

    let response = app.get("/catalog/author/999/update/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.post_empty("/catalog/author/999/update/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/catalog/author/999/delete/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.post_form("/catalog/author/999/delete/", None, "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(app.get("/catalog/authors/", None).await).await;
    assert_eq!(body["context"]["count"], 2);
}
