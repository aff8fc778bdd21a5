use std::collections::HashSet;

use itertools::Itertools;
use tracing::{trace, warn};

use crate::PAGE_SIZE;
use crate::model::{HasId, Opportunity, Pyq, Senior, Subject};

#[derive(Debug, Default, Clone, PartialEq, strum::EnumIs)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

pub trait Matches<T> {
    fn matches(&self, item: &T) -> bool;
}

/// Matches everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct All;

impl<T> Matches<T> for All {
    fn matches(&self, _item: &T) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: Vec<&'a T>,
    /// 1-based, already clamped.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// A fully fetched list that is filtered and paginated locally.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    status: LoadStatus,
    page: usize,
    page_size: usize,
    pending: HashSet<String>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: LoadStatus::Idle,
            page: 1,
            page_size: PAGE_SIZE,
            pending: HashSet::new(),
        }
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn begin_load(&mut self) {
        self.status = LoadStatus::Loading;
    }

    pub fn loaded(&mut self, items: Vec<T>) {
        trace!("collection loaded {} items", items.len());
        self.items = items;
        self.status = LoadStatus::Loaded;
    }

    /// Keeps the previous items so the view stays in its prior state.
    pub fn failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("collection failed to load: {reason}");
        self.status = LoadStatus::Failed(reason);
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn view<F: Matches<T>>(&self, filter: &F) -> Page<'_, T> {
        let filtered = self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .collect::<Vec<&T>>();
        let total_items = filtered.len();
        let total_pages = total_items.div_ceil(self.page_size).max(1);
        let page = self.page.clamp(1, total_pages);
        let items = filtered
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect();

        Page {
            items,
            page,
            total_pages,
            total_items,
        }
    }

    /// Marks `id` as busy. Returns false when it already was.
    pub fn begin(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.pending.contains(&id) {
            warn!("{id} is still pending");
            return false;
        }
        self.pending.insert(id)
    }

    pub fn finish(&mut self, id: &str) {
        self.pending.remove(id);
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }
}

impl<T: HasId> Collection<T> {
    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }
}

fn eq_or_any(wanted: &str, value: &str) -> bool {
    wanted.is_empty() || wanted == value
}

/// Empty fields match anything, like an unselected dropdown.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PyqFilter {
    pub search: String,
    pub year: String,
    pub semester: String,
    pub course: String,
    pub branch: String,
    pub exam_type: String,
}

impl Matches<Pyq> for PyqFilter {
    fn matches(&self, pyq: &Pyq) -> bool {
        let search = self.search.trim().to_lowercase();
        (search.is_empty() || pyq.subject_name.to_lowercase().contains(&search))
            && eq_or_any(&self.year, &pyq.year)
            && eq_or_any(&self.semester, &pyq.semester)
            && eq_or_any(&self.course, &pyq.course)
            && (self.branch.is_empty() || pyq.branch.contains(&self.branch))
            && eq_or_any(&self.exam_type, &pyq.exam_type)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeniorFilter {
    pub branch: String,
    pub year: String,
}

impl Matches<Senior> for SeniorFilter {
    fn matches(&self, senior: &Senior) -> bool {
        eq_or_any(&self.branch, &senior.branch) && eq_or_any(&self.year, &senior.year)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SubjectFilter {
    pub search: String,
}

impl Matches<Subject> for SubjectFilter {
    fn matches(&self, subject: &Subject) -> bool {
        let search = self.search.trim().to_lowercase();
        search.is_empty()
            || subject.subject_name.to_lowercase().contains(&search)
            || subject.subject_code.to_lowercase().contains(&search)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollegeFilter {
    pub college_id: String,
}

impl Matches<Senior> for CollegeFilter {
    fn matches(&self, senior: &Senior) -> bool {
        eq_or_any(&self.college_id, senior.college.id())
    }
}

impl Matches<Opportunity> for CollegeFilter {
    fn matches(&self, opportunity: &Opportunity) -> bool {
        match &opportunity.college {
            Some(college) => eq_or_any(&self.college_id, college.id()),
            None => self.college_id.is_empty(),
        }
    }
}

/// Both filters must match.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct And<A, B>(pub A, pub B);

impl<T, A: Matches<T>, B: Matches<T>> Matches<T> for And<A, B> {
    fn matches(&self, item: &T) -> bool {
        self.0.matches(item) && self.1.matches(item)
    }
}

pub fn distinct<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    field: impl Fn(&'a T) -> &'a str,
) -> Vec<String> {
    items
        .into_iter()
        .map(field)
        .filter(|value| !value.is_empty())
        .unique()
        .sorted()
        .map(String::from)
        .collect()
}

pub fn pyq_courses(pyqs: &[Pyq]) -> Vec<String> {
    distinct(pyqs, |pyq| pyq.course.as_str())
}

pub fn pyq_years(pyqs: &[Pyq]) -> Vec<String> {
    let mut years = distinct(pyqs, |pyq| pyq.year.as_str());
    years.reverse();
    years
}

pub fn pyq_exam_types(pyqs: &[Pyq]) -> Vec<String> {
    distinct(pyqs, |pyq| pyq.exam_type.as_str())
}

/// Branches offered for `course`, or for every course when it is empty.
pub fn pyq_branches(pyqs: &[Pyq], course: &str) -> Vec<String> {
    pyqs.iter()
        .filter(|pyq| eq_or_any(course, &pyq.course))
        .flat_map(|pyq| pyq.branch.iter())
        .filter(|branch| !branch.is_empty())
        .unique()
        .sorted()
        .map(String::from)
        .collect()
}

pub fn senior_branches(seniors: &[Senior]) -> Vec<String> {
    distinct(seniors, |senior| senior.branch.as_str())
}

fn semester_order(semester: &str) -> (u32, String) {
    (
        semester.trim().parse::<u32>().unwrap_or(u32::MAX),
        semester.to_string(),
    )
}

/// Groups subjects by semester, lowest semester first.
pub fn group_by_semester<'a>(
    subjects: impl IntoIterator<Item = &'a Subject>,
) -> Vec<(String, Vec<&'a Subject>)> {
    let groups = subjects
        .into_iter()
        .sorted_by_key(|subject| semester_order(&subject.semester))
        .chunk_by(|subject| subject.semester.clone());
    groups
        .into_iter()
        .map(|(semester, group)| (semester, group.collect()))
        .collect()
}

#[cfg(test)]
mod collection_tests {
    use super::*;
    use crate::model::Branches;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_log::test;

    fn pyq(subject: &str, year: &str, course: &str, branch: Branches, exam: &str) -> Pyq {
        Pyq {
            subject_name: subject.into(),
            subject_code: String::new(),
            semester: "1".into(),
            year: year.into(),
            course: course.into(),
            branch,
            exam_type: exam.into(),
            link: String::new(),
        }
    }

    fn pyqs() -> Vec<Pyq> {
        vec![
            pyq("Engineering Maths", "2023", "BTech", Branches::One("CSE".into()), "midsem"),
            pyq(
                "Physics",
                "2022",
                "BTech",
                Branches::Many(vec!["ME".into(), "CSE".into()]),
                "endsem",
            ),
            pyq("Data Structures", "2023", "BTech", Branches::One("CSE".into()), "endsem"),
            pyq("Accounting", "2021", "BCom", Branches::One("Finance".into()), "endsem"),
        ]
    }

    #[test]
    fn test_pagination_is_clamped() {
        let mut collection = Collection::new();
        collection.loaded((0..14).collect::<Vec<u32>>());

        let page = collection.view(&All);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![&0, &1, &2, &3, &4, &5]);
        assert!(!page.has_prev());

        collection.set_page(3);
        let page = collection.view(&All);
        assert_eq!(page.items, vec![&12, &13]);
        assert!(!page.has_next());

        collection.set_page(99);
        assert_eq!(collection.view(&All).page, 3);

        collection.set_page(0);
        assert_eq!(collection.view(&All).page, 1);
    }

    #[test]
    fn test_empty_view_has_one_page() {
        let collection = Collection::<u32>::new();
        let page = collection.view(&All);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_status_and_pending() {
        let mut collection = Collection::<u32>::with_page_size(2);
        assert!(collection.status().is_idle());
        collection.begin_load();
        assert!(collection.status().is_loading());
        collection.loaded(vec![1, 2, 3]);
        collection.failed("boom");
        assert_eq!(collection.status(), &LoadStatus::Failed("boom".into()));
        assert_eq!(collection.items().len(), 3);
        assert_eq!(collection.view(&All).total_pages, 2);

        assert!(collection.begin("s1"));
        assert!(!collection.begin("s1"));
        assert!(collection.is_pending("s1"));
        collection.finish("s1");
        assert!(!collection.is_pending("s1"));
    }

    #[test]
    fn test_pyq_filter() {
        let mut collection = Collection::new();
        collection.loaded(pyqs());

        let filter = PyqFilter {
            search: "  MATHS ".into(),
            ..Default::default()
        };
        assert_eq!(collection.view(&filter).total_items, 1);

        let filter = PyqFilter {
            branch: "CSE".into(),
            exam_type: "endsem".into(),
            ..Default::default()
        };
        let names = collection
            .view(&filter)
            .items
            .iter()
            .map(|pyq| pyq.subject_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Physics", "Data Structures"]);

        let filter = PyqFilter {
            year: "2023".into(),
            course: "BCom".into(),
            ..Default::default()
        };
        assert_eq!(collection.view(&filter).total_items, 0);
    }

    #[test]
    fn test_distinct_helpers() {
        let pyqs = pyqs();
        assert_eq!(pyq_courses(&pyqs), vec!["BCom", "BTech"]);
        assert_eq!(pyq_years(&pyqs), vec!["2023", "2022", "2021"]);
        assert_eq!(pyq_exam_types(&pyqs), vec!["endsem", "midsem"]);
        assert_eq!(pyq_branches(&pyqs, "BTech"), vec!["CSE", "ME"]);
        assert_eq!(pyq_branches(&pyqs, ""), vec!["CSE", "Finance", "ME"]);
    }

    #[test]
    fn test_senior_and_college_filters() {
        let seniors: Vec<Senior> = serde_json::from_value(json!([
            { "_id": "s1", "name": "A", "branch": "CSE", "year": 4, "college": "c1" },
            { "_id": "s2", "name": "B", "branch": "ME", "year": 3, "college": "c1" },
            { "_id": "s3", "name": "C", "branch": "CSE", "year": 3, "college": "c2" }
        ]))
        .unwrap();
        let mut collection = Collection::new();
        collection.loaded(seniors);

        let filter = And(
            CollegeFilter { college_id: "c1".into() },
            SeniorFilter { branch: "CSE".into(), year: String::new() },
        );
        let page = collection.view(&filter);
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].id, "s1");
        assert_eq!(senior_branches(collection.items()), vec!["CSE", "ME"]);

        assert_eq!(collection.remove("s2").map(|s| s.name), Some("B".into()));
        assert!(collection.find("s2").is_none());
    }

    #[test]
    fn test_subjects_grouped_by_semester() {
        let subjects: Vec<Subject> = serde_json::from_value(json!([
            { "_id": "a", "subjectName": "Compilers", "subjectCode": "CS601", "semester": 6 },
            { "_id": "b", "subjectName": "Maths", "subjectCode": "MA101", "semester": "1" },
            { "_id": "c", "subjectName": "Networks", "subjectCode": "CS501", "semester": 10 },
            { "_id": "d", "subjectName": "Physics", "subjectCode": "PH101", "semester": 1 }
        ]))
        .unwrap();

        let groups = group_by_semester(&subjects)
            .into_iter()
            .map(|(semester, subjects)| (semester, subjects.len()))
            .collect::<Vec<_>>();
        assert_eq!(
            groups,
            vec![("1".to_string(), 2), ("6".to_string(), 1), ("10".to_string(), 1)]
        );

        let filter = SubjectFilter { search: "cs6".into() };
        assert!(filter.matches(&subjects[0]));
        assert!(!filter.matches(&subjects[1]));
    }
}
