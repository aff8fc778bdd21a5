use crate::model::OpportunityKind;

pub const PATH_API: &str = "/api";
pub const PATH_API_COLLEGES: &str = "/colleges";
pub const PATH_API_PYQS: &str = "/pyqs";
pub const PATH_API_COURSES: &str = "/courses";
pub const PATH_API_BRANCHES: &str = "/branches";
pub const PATH_API_SUBJECTS: &str = "/subjects";
pub const PATH_API_COMMUNITY: &str = "/community";
pub const PATH_API_SENIORS: &str = "/seniors";
pub const PATH_API_SUBJECT_NOTES: &str = "/subjectNotes";
pub const PATH_API_PRESIGNED_URL: &str = "/presignedUrl";

pub const PATH_HOME: &str = "/";
pub const PATH_INSTALL: &str = "/install";
pub const PATH_COLLEGE: &str = "/college/:college";

pub fn api_post(post_id: &str) -> String {
    format!("{PATH_API_COMMUNITY}/{post_id}")
}

pub fn api_post_like(post_id: &str) -> String {
    format!("{PATH_API_COMMUNITY}/{post_id}/like")
}

pub fn api_post_comments(post_id: &str) -> String {
    format!("{PATH_API_COMMUNITY}/{post_id}/comments")
}

pub fn api_post_comment(post_id: &str, comment_id: &str) -> String {
    format!("{PATH_API_COMMUNITY}/{post_id}/comments/{comment_id}")
}

pub fn api_post_comment_like(post_id: &str, comment_id: &str) -> String {
    format!("{PATH_API_COMMUNITY}/{post_id}/comments/{comment_id}/like")
}

pub fn api_branches(course_id: &str) -> String {
    format!("{PATH_API_BRANCHES}/{course_id}")
}

pub fn api_subjects(branch_id: &str) -> String {
    format!("{PATH_API_SUBJECTS}/{branch_id}")
}

pub fn api_seniors_of(college_id: &str) -> String {
    format!("{PATH_API_SENIORS}/college/{college_id}")
}

pub fn api_senior(senior_id: &str) -> String {
    format!("{PATH_API_SENIORS}/{senior_id}")
}

pub fn api_subject_notes_of(subject_code: &str, branch_code: &str, college_id: &str) -> String {
    format!("{PATH_API_SUBJECT_NOTES}/{subject_code}/{branch_code}/{college_id}")
}

pub fn api_subject_note(id_or_slug: &str) -> String {
    format!("{PATH_API_SUBJECT_NOTES}/{id_or_slug}")
}

pub fn api_subject_note_like(note_id: &str) -> String {
    format!("{PATH_API_SUBJECT_NOTES}/{note_id}/like")
}

pub fn api_opportunities(kind: OpportunityKind) -> String {
    format!("/{kind}")
}

pub fn api_opportunities_of(kind: OpportunityKind, college_id: &str) -> String {
    format!("/{kind}/college/{college_id}")
}

pub fn api_opportunity(kind: OpportunityKind, id: &str) -> String {
    format!("/{kind}/{id}")
}

/// Lower-cased name with every run of whitespace replaced by a single `-`.
pub fn college_slug(name: impl AsRef<str>) -> String {
    name.as_ref()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

pub fn link_college(slug: impl AsRef<str>) -> String {
    format!("/college/{}", slug.as_ref())
}

pub fn link_seniors(slug: impl AsRef<str>) -> String {
    format!("/college/{}/seniors", slug.as_ref())
}

pub fn link_add_senior(slug: impl AsRef<str>) -> String {
    format!("/college/{}/seniors/add", slug.as_ref())
}

pub fn link_pyq(slug: impl AsRef<str>) -> String {
    format!("/college/{}/pyq", slug.as_ref())
}

pub fn link_community(slug: impl AsRef<str>) -> String {
    format!("/college/{}/community", slug.as_ref())
}

pub fn link_post(slug: impl AsRef<str>, post_id: impl AsRef<str>) -> String {
    format!(
        "/college/{}/community/post/{}",
        slug.as_ref(),
        post_id.as_ref()
    )
}

pub fn link_opportunities(slug: impl AsRef<str>) -> String {
    format!("/college/{}/opportunities", slug.as_ref())
}

pub fn link_notes(slug: impl AsRef<str>) -> String {
    format!("/college/{}/notes", slug.as_ref())
}

pub fn link_subjects(
    slug: impl AsRef<str>,
    course_code: impl AsRef<str>,
    branch_code: impl AsRef<str>,
) -> String {
    format!(
        "/college/{}/notes/{}/{}",
        slug.as_ref(),
        course_code.as_ref(),
        branch_code.as_ref()
    )
}

pub fn link_subject_notes(
    slug: impl AsRef<str>,
    course_code: impl AsRef<str>,
    branch_code: impl AsRef<str>,
    subject_code: impl AsRef<str>,
) -> String {
    format!(
        "/college/{}/notes/{}/{}/{}",
        slug.as_ref(),
        course_code.as_ref(),
        branch_code.as_ref(),
        subject_code.as_ref().to_lowercase()
    )
}

pub fn link_note(
    slug: impl AsRef<str>,
    course_code: impl AsRef<str>,
    branch_code: impl AsRef<str>,
    subject_code: impl AsRef<str>,
    note_slug: impl AsRef<str>,
) -> String {
    format!(
        "{}/{}",
        link_subject_notes(slug, course_code, branch_code, subject_code),
        note_slug.as_ref()
    )
}

#[cfg(test)]
mod path_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn test_college_slug() {
        assert_eq!(college_slug("Integral University"), "integral-university");
        assert_eq!(college_slug("  MMMUT   Gorakhpur\tCampus "), "mmmut-gorakhpur-campus");
        assert_eq!(college_slug("kgmu"), "kgmu");
    }

    #[test]
    fn test_links() {
        assert_eq!(link_post("iul", "p1"), "/college/iul/community/post/p1");
        assert_eq!(
            link_note("iul", "btech", "cse", "CS601", "unit-1"),
            "/college/iul/notes/btech/cse/cs601/unit-1"
        );
        assert_eq!(api_post_comment_like("p1", "k1"), "/community/p1/comments/k1/like");
        assert_eq!(
            api_opportunities_of(OpportunityKind::Get, "c1"),
            "/getOpportunity/college/c1"
        );
        assert_eq!(api_subject_notes_of("CS601", "CSE", "c1"), "/subjectNotes/CS601/CSE/c1");
    }
}
