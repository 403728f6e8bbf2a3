use crate::pagination::collect_pages;
use crate::prelude::*;
use indicatif::ProgressBar;
use nonfollowers_core::instagram::{
    friendships_url, next_cursor, transform_instagram_users, InstagramFriendshipsResponse,
};
use nonfollowers_core::pagination::Page;
use nonfollowers_core::user::{RelationKind, UserRecord};

use super::client::InstagramClient;

async fn fetch_page(client: &InstagramClient, url: String) -> Result<Page<UserRecord>> {
    let response: InstagramFriendshipsResponse = client.get_json(&url).await?;
    let next = next_cursor(&response);

    Ok(Page::new(transform_instagram_users(response.users), next))
}

/// Fetch every account on one side of the follow graph, following `next_max_id`
pub async fn list_relation(
    client: &InstagramClient,
    user_id: &str,
    relation: RelationKind,
    page_size: u32,
    spinner: Option<&ProgressBar>,
) -> Result<Vec<UserRecord>> {
    collect_pages(relation.as_str(), spinner, move |cursor| {
        let encoded = cursor.map(|c| urlencoding::encode(&c).into_owned());
        let url = friendships_url(
            client.api_url(),
            user_id,
            relation.as_str(),
            page_size,
            encoded.as_deref(),
        );
        fetch_page(client, url)
    })
    .await
}
