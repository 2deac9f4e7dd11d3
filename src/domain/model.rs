use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub title: String,
    pub body: String,
}

impl Post {
    pub fn new(id: i64, user_id: i64, title: &str, body: &str) -> Self {
        Self {
            id,
            user_id,
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    /// 顯示在輸出區的文字區塊
    pub fn display_block(&self) -> String {
        format!("title = {}\nbody={}", self.title, self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

impl User {
    pub fn new(id: i64, name: &str, surname: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            surname: surname.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "postId")]
    pub post_id: i64,
    pub id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_uses_api_field_names() {
        let json = r#"{"id": 3, "userId": 2, "title": "t", "body": "b"}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post, Post::new(3, 2, "t", "b"));

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["userId"], 2);
    }

    #[test]
    fn test_user_without_surname() {
        // jsonplaceholder 的 users 沒有 surname 欄位
        let user: User = serde_json::from_str(r#"{"id": 1, "name": "Leanne"}"#).unwrap();
        assert_eq!(user.surname, "");
    }

    #[test]
    fn test_comment_deserializes() {
        let json = r#"{"postId": 1, "id": 5, "name": "n", "email": "a@b.c", "body": "hi"}"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.post_id, 1);
        assert_eq!(comment.email, "a@b.c");
    }

    #[test]
    fn test_display_block() {
        let post = Post::new(1, 1, "title", "some insightful dissertation...");
        assert_eq!(
            post.display_block(),
            "title = title\nbody=some insightful dissertation..."
        );
    }
}
