//! Plain-text rendering of Chirp views for the terminal.

#[cfg(test)]
#[path = "views_test.rs"]
mod views_test;

use chirp::net::error::ApiError;
use chirp::net::types::{Notification, NotificationKind, Trend, Tweet, UserProfile, UserSummary};

/// One-line notice for a failed call. Sign-in screens prefer the backend's
/// message; every other screen shows its own fixed text. Denied authorization
/// has no notice: the session has already redirected to the entry view.
pub fn notice(err: ApiError, fallback: &str, prefer_server_message: bool) -> Option<String> {
    if err.is_auth_denied() {
        return None;
    }
    let failure = err.into_failure();
    let text = if prefer_server_message { failure.message_or(fallback) } else { fallback };
    Some(text.to_owned())
}

pub fn user_line(user: &UserSummary) -> String {
    format!("{} {}", user.name, user.handle())
}

pub fn tweet(tweet: &Tweet) -> String {
    let mut out = String::new();
    if tweet.is_retweet {
        if let Some(by) = &tweet.retweeted_by {
            out.push_str(&format!("  {} rechirped\n", by.name));
        }
    }
    out.push_str(&format!("[{}] {}", tweet.id, user_line(&tweet.user)));
    if let Some(parent) = tweet.reply_to.as_ref().and_then(|reply_to| reply_to.username()) {
        out.push_str(&format!(" replying to @{parent}"));
    }
    out.push('\n');
    out.push_str(&format!("  {}\n", tweet.content));
    out.push_str(&format!(
        "  {} replies  {} rechirps{}  {} likes{}",
        tweet.reply_count,
        tweet.retweet_count,
        if tweet.is_retweeted { "*" } else { "" },
        tweet.like_count,
        if tweet.is_liked { "*" } else { "" },
    ));
    out
}

/// Tweets separated by blank lines, or the view's empty-state text.
pub fn tweet_list(tweets: &[Tweet], empty: &str) -> String {
    if tweets.is_empty() {
        return empty.to_owned();
    }
    tweets.iter().map(tweet).collect::<Vec<_>>().join("\n\n")
}

pub fn profile(profile: &UserProfile, own: bool) -> String {
    let mut lines = vec![user_line(&profile.user)];
    for value in [&profile.bio, &profile.location, &profile.website].into_iter().flatten() {
        if !value.is_empty() {
            lines.push(value.clone());
        }
    }
    lines.push(format!("{} following  {} followers", profile.following, profile.followers));
    if !own && profile.is_following {
        lines.push("You follow this user".to_owned());
    }
    lines.join("\n")
}

pub fn notification(item: &Notification) -> String {
    let marker = if item.read { " " } else { "*" };
    let verb = match item.kind {
        NotificationKind::Like => "liked your chirp",
        NotificationKind::Retweet => "rechirped your chirp",
        NotificationKind::Mention => "mentioned you",
        NotificationKind::Follow => "followed you",
        NotificationKind::Other => item.message.as_str(),
    };
    format!("{marker} [{}] {} {verb}", item.id, item.sender.name)
}

pub fn trend(trend: &Trend) -> String {
    format!("{}  #{}  {} chirps", trend.category, trend.hashtag.trim_start_matches('#'), trend.tweet_count)
}
