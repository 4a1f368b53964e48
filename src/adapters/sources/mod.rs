//! Dataset sources: primary JSON feeds, legacy XML-RPC fallbacks and built-in samples.
//!
//! `SourceFactory` turns the per-dataset descriptors into ready source selectors.
//! The document format is picked from the reference: `.xml` is XML-RPC, anything else JSON.

pub mod document;
pub mod fetch;
pub mod json_feed;
pub mod records;
pub mod sample;
pub mod xmlrpc;

pub use document::{Decoder, DocumentSource, Generator, SampleSource};
pub use fetch::Location;

use crate::domain::{BellSchedule, Calendar, DayCycle, LessonSet, SourceDescriptor};
use crate::ports::{Clock, DatasetSource};
use crate::usecases::SourceSelector;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;

struct Codec<T> {
    json: Decoder<T>,
    xml: Decoder<T>,
    sample: Generator<T>,
}

pub struct SourceFactory {
    client: Client,
    base_dir: PathBuf,
    cycle: DayCycle,
    clock: Arc<dyn Clock>,
    use_sample_data: bool,
}

impl SourceFactory {
    pub fn new(
        client: Client,
        base_dir: impl Into<PathBuf>,
        cycle: DayCycle,
        clock: Arc<dyn Clock>,
        use_sample_data: bool,
    ) -> Self {
        Self {
            client,
            base_dir: base_dir.into(),
            cycle,
            clock,
            use_sample_data,
        }
    }

    pub fn calendar(&self, descriptor: &SourceDescriptor) -> SourceSelector<Calendar> {
        self.selector(
            descriptor,
            Codec {
                json: json_feed::decode_calendar,
                xml: xmlrpc::decode_calendar,
                sample: sample::sample_calendar,
            },
        )
    }

    pub fn bell_schedule(&self, descriptor: &SourceDescriptor) -> SourceSelector<BellSchedule> {
        self.selector(
            descriptor,
            Codec {
                json: json_feed::decode_bell_times,
                xml: xmlrpc::decode_bell_times,
                sample: sample::sample_bell_schedule,
            },
        )
    }

    pub fn lessons(&self, descriptor: &SourceDescriptor) -> SourceSelector<LessonSet> {
        self.selector(
            descriptor,
            Codec {
                json: json_feed::decode_lessons,
                xml: xmlrpc::decode_lessons,
                sample: sample::sample_lessons,
            },
        )
    }

    fn selector<T>(&self, descriptor: &SourceDescriptor, codec: Codec<T>) -> SourceSelector<T>
    where
        T: Default + Send + 'static,
    {
        let primary = descriptor
            .primary
            .as_deref()
            .map(|r| self.document(r, &codec));
        let fallback = descriptor
            .fallback
            .as_deref()
            .map(|r| self.document(r, &codec));
        let sample = self.use_sample_data.then(|| {
            Arc::new(SampleSource::new(self.clock.clone(), self.cycle.clone(), codec.sample))
                as Arc<dyn DatasetSource<T>>
        });
        SourceSelector::new(
            descriptor.dataset,
            descriptor.stale_after_days,
            primary,
            fallback,
            sample,
        )
    }

    fn document<T>(&self, reference: &str, codec: &Codec<T>) -> Arc<dyn DatasetSource<T>>
    where
        T: Send + 'static,
    {
        let location = Location::resolve(reference, &self.base_dir);
        let decode = if is_xml(reference) { codec.xml } else { codec.json };
        Arc::new(DocumentSource::new(
            location,
            self.client.clone(),
            self.cycle.clone(),
            decode,
        ))
    }
}

fn is_xml(reference: &str) -> bool {
    let path = reference.split(['?', '#']).next().unwrap_or(reference);
    path.to_ascii_lowercase().ends_with(".xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::domain::{Dataset, Origin};
    use chrono::NaiveDate;

    fn factory(dir: &std::path::Path, sample: bool) -> SourceFactory {
        let now = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(8, 50, 0)
            .unwrap();
        SourceFactory::new(
            Client::new(),
            dir,
            DayCycle::default(),
            Arc::new(FixedClock::new(now)),
            sample,
        )
    }

    fn descriptor(primary: Option<&str>, fallback: Option<&str>) -> SourceDescriptor {
        SourceDescriptor {
            dataset: Dataset::Lessons,
            primary: primary.map(str::to_string),
            fallback: fallback.map(str::to_string),
            stale_after_days: 7,
        }
    }

    #[test]
    fn xml_detection() {
        assert!(is_xml("timetable.xml"));
        assert!(is_xml("https://host/Calendar.XML?x=1"));
        assert!(!is_xml("liss_info.json"));
    }

    #[tokio::test]
    async fn fallback_picked_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("timetable.xml"),
            "<methodResponse><params><param><value><array><data><value><struct>\
             <member><name>DayNumber</name><value><i4>1</i4></value></member>\
             <member><name>Period</name><value><string>P1</string></value></member>\
             <member><name>ClassCode</name><value><string>9MU1</string></value></member>\
             </struct></value></data></array></value></param></params></methodResponse>",
        )
        .unwrap();
        let selector = factory(dir.path(), false)
            .lessons(&descriptor(Some("liss_info.json"), Some("timetable.xml")));
        let now = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(8, 50, 0)
            .unwrap();
        let selected = selector.select(now).await;
        assert_eq!(selected.origin, Origin::Fallback);
        assert_eq!(selected.data.len(), 1);
    }

    #[tokio::test]
    async fn sample_only_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let now = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(8, 50, 0)
            .unwrap();
        let off = factory(dir.path(), false).lessons(&descriptor(Some("a.json"), None));
        assert_eq!(off.select(now).await.origin, Origin::Missing);
        let on = factory(dir.path(), true).lessons(&descriptor(Some("a.json"), None));
        let selected = on.select(now).await;
        assert_eq!(selected.origin, Origin::Sample);
        assert!(!selected.data.is_empty());
    }
}
