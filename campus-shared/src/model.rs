use indexmap::IndexSet;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

pub trait HasId {
    fn id(&self) -> &str;
}

/// Entity that carries a set of liker user ids and can be toggled optimistically.
pub trait Likeable: HasId {
    fn likers(&self) -> &IndexSet<String>;
    fn likers_mut(&mut self) -> &mut IndexSet<String>;

    fn is_liked_by(&self, user_id: &str) -> bool {
        self.likers().contains(user_id)
    }
}

/// A reference the backend may send either as a bare id or as a populated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(String),
    Populated(T),
}

impl<T: HasId> Ref<T> {
    pub fn id(&self) -> &str {
        match self {
            Ref::Id(id) => id,
            Ref::Populated(value) => value.id(),
        }
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Populated(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl HasId for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Ref<User> {
    pub fn username(&self) -> Option<&str> {
        self.populated()
            .map(|user| user.username.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn profile_picture(&self) -> Option<&str> {
        self.populated().and_then(|user| user.profile_picture.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct College {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl HasId for College {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: Ref<User>,
    pub content: String,
    #[serde(default)]
    pub is_anonymous: bool,
    pub college: Ref<College>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub likes: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Post {
    pub fn author_name(&self) -> &str {
        if self.is_anonymous {
            return "Anonymous";
        }
        self.author.username().unwrap_or("Unknown Author")
    }

    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == comment_id)
    }

    pub fn comment_mut(&mut self, comment_id: &str) -> Option<&mut Comment> {
        self.comments
            .iter_mut()
            .find(|comment| comment.id == comment_id)
    }

    pub fn latest_comment(&self) -> Option<&Comment> {
        self.comments.last()
    }
}

impl HasId for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Likeable for Post {
    fn likers(&self) -> &IndexSet<String> {
        &self.likes
    }

    fn likers_mut(&mut self) -> &mut IndexSet<String> {
        &mut self.likes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: Ref<User>,
    pub content: String,
    #[serde(default)]
    pub likes: CommentLikes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        self.author.username().unwrap_or("Anonymous")
    }
}

impl HasId for Comment {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Comment likes arrive as a plain counter from the current backend. A liker set is accepted
/// too, so a backend that enforces one-like-per-user can be adopted without a client change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentLikes {
    Count(u64),
    Likers(IndexSet<String>),
}

impl Default for CommentLikes {
    fn default() -> Self {
        CommentLikes::Count(0)
    }
}

impl CommentLikes {
    pub fn count(&self) -> u64 {
        match self {
            CommentLikes::Count(count) => *count,
            CommentLikes::Likers(likers) => likers.len() as u64,
        }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        match self {
            CommentLikes::Count(_) => false,
            CommentLikes::Likers(likers) => likers.contains(user_id),
        }
    }

    pub fn is_counter(&self) -> bool {
        matches!(self, CommentLikes::Count(_))
    }

    /// Returns false when nothing changed.
    pub fn add(&mut self, user_id: Option<&str>) -> bool {
        match (self, user_id) {
            (CommentLikes::Count(count), _) => {
                *count += 1;
                true
            }
            (CommentLikes::Likers(likers), Some(user_id)) => likers.insert(user_id.to_string()),
            (CommentLikes::Likers(_), None) => false,
        }
    }

    pub fn remove(&mut self, user_id: Option<&str>) -> bool {
        match (self, user_id) {
            (CommentLikes::Count(count), _) => {
                let changed = *count > 0;
                *count = count.saturating_sub(1);
                changed
            }
            (CommentLikes::Likers(likers), Some(user_id)) => likers.shift_remove(user_id),
            (CommentLikes::Likers(_), None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Senior {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default, deserialize_with = "string_or_number::deserialize")]
    pub year: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default, deserialize_with = "string_or_number::deserialize")]
    pub whatsapp: String,
    #[serde(
        default,
        deserialize_with = "string_or_number::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub telegram: Option<String>,
    pub college: Ref<College>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Ref<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl HasId for Senior {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeniorForm {
    pub name: String,
    pub branch: String,
    pub year: String,
    pub domain: String,
    pub whatsapp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    pub college: String,
}

impl From<&Senior> for SeniorForm {
    fn from(senior: &Senior) -> Self {
        Self {
            name: senior.name.clone(),
            branch: senior.branch.clone(),
            year: senior.year.clone(),
            domain: senior.domain.clone(),
            whatsapp: senior.whatsapp.clone(),
            telegram: senior.telegram.clone(),
            college: senior.college.id().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub course_name: String,
    pub course_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    #[serde(rename = "_id")]
    pub id: String,
    pub branch_name: String,
    pub branch_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject_name: String,
    pub subject_code: String,
    #[serde(default, deserialize_with = "string_or_number::deserialize")]
    pub semester: String,
}

impl HasId for Subject {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectNote {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Ref<Subject>>,
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Ref<User>>,
    #[serde(default)]
    pub likes: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<Ref<College>>,
}

impl HasId for SubjectNote {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Likeable for SubjectNote {
    fn likers(&self) -> &IndexSet<String> {
        &self.likes
    }

    fn likers_mut(&mut self) -> &mut IndexSet<String> {
        &mut self.likes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMeta {
    pub title: String,
    pub description: String,
    pub subject_code: String,
    pub branch_code: String,
    pub college: String,
    pub file_url: String,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
pub enum OpportunityKind {
    #[strum(serialize = "getOpportunity")]
    Get,
    #[strum(serialize = "giveOpportunity")]
    Give,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_number::deserialize")]
    pub whatsapp: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<Ref<College>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Ref<User>>,
}

impl HasId for Opportunity {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityForm {
    pub name: String,
    pub description: String,
    pub whatsapp: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
}

impl From<&Opportunity> for OpportunityForm {
    fn from(value: &Opportunity) -> Self {
        Self {
            name: value.name.clone(),
            description: value.description.clone(),
            whatsapp: value.whatsapp.clone(),
            email: value.email.clone(),
            college: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Branches {
    One(String),
    Many(Vec<String>),
}

impl Default for Branches {
    fn default() -> Self {
        Branches::Many(Vec::new())
    }
}

impl Branches {
    pub fn contains(&self, branch: &str) -> bool {
        match self {
            Branches::One(one) => one == branch,
            Branches::Many(many) => many.iter().any(|v| v == branch),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Branches::One(one) => std::slice::from_ref(one),
            Branches::Many(many) => many,
        };
        slice.iter().map(String::as_str)
    }

    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pyq {
    pub subject_name: String,
    #[serde(default)]
    pub subject_code: String,
    #[serde(default, deserialize_with = "string_or_number::deserialize")]
    pub semester: String,
    #[serde(default, deserialize_with = "string_or_number::deserialize")]
    pub year: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub branch: Branches,
    #[serde(default)]
    pub exam_type: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub content: String,
    pub is_anonymous: bool,
    pub college: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditPost {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub file_name: String,
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrl {
    pub upload_url: String,
    pub key: String,
}

/// Session user persisted by the external identity flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

pub mod string_or_number {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    impl From<Raw> for String {
        fn from(value: Raw) -> Self {
            match value {
                Raw::Str(v) => v,
                Raw::Num(v) => v.to_string(),
            }
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Raw::deserialize(deserializer).map(String::from)
    }

    pub fn option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Option::<Raw>::deserialize(deserializer).map(|v| v.map(String::from))
    }
}
