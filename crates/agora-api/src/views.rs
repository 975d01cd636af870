//! Response shaping for posts and comments: reaction totals plus the
//! viewer's own reaction.

use agora_core::Forum;
use agora_types::ForumResult;
use agora_types::api::{CommentResponse, PostResponse, ReactionInfo};
use agora_types::models::{Comment, Post, ReactionTarget, UserId};

pub async fn post_view(forum: &Forum, viewer: UserId, post: Post) -> ForumResult<PostResponse> {
    let summary = forum
        .reactions
        .summary(viewer, ReactionTarget::Post(post.id))
        .await?;
    Ok(PostResponse::new(
        post,
        summary.total,
        summary.mine.map(ReactionInfo::from),
    ))
}

pub async fn post_views(
    forum: &Forum,
    viewer: UserId,
    posts: Vec<Post>,
) -> ForumResult<Vec<PostResponse>> {
    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        views.push(post_view(forum, viewer, post).await?);
    }
    Ok(views)
}

pub async fn comment_view(
    forum: &Forum,
    viewer: UserId,
    comment: Comment,
) -> ForumResult<CommentResponse> {
    let owner = forum.accounts.get(comment.owner_id).await?;
    let summary = forum
        .reactions
        .summary(viewer, ReactionTarget::Comment(comment.id))
        .await?;
    Ok(CommentResponse::new(
        comment,
        &owner,
        summary.total,
        summary.mine.map(ReactionInfo::from),
    ))
}

pub async fn comment_views(
    forum: &Forum,
    viewer: UserId,
    comments: Vec<Comment>,
) -> ForumResult<Vec<CommentResponse>> {
    let mut views = Vec::with_capacity(comments.len());
    for comment in comments {
        views.push(comment_view(forum, viewer, comment).await?);
    }
    Ok(views)
}
