use serde::Deserialize;

use crate::points::table::ReadingKind;

/// How point topics map onto MQTT subscriptions.
///
/// - `Split`: each base topic has two children, `<base>/temperature` and
///   `<base>/humidity`.
/// - `Direct`: the base topic itself carries a temperature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicLayout {
    #[default]
    Split,
    Direct,
}

impl TopicLayout {
    /// Reading kinds a point carries under this layout, in replay order.
    pub fn kinds(self) -> &'static [ReadingKind] {
        match self {
            TopicLayout::Split => &[ReadingKind::Temperature, ReadingKind::Humidity],
            TopicLayout::Direct => &[ReadingKind::Temperature],
        }
    }
}

/// Ordered list of base topics, one slot per point index.
///
/// A missing entry keeps its slot so that index `i` always refers to the
/// `i`-th configured point.
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
    topics: Vec<Option<String>>,
}

impl TopicRegistry {
    /// Builds the registry. Blank topics are treated as absent.
    pub fn new(topics: Vec<Option<String>>) -> Self {
        let topics = topics
            .into_iter()
            .map(|t| t.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
            .collect();
        Self { topics }
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topic(&self, index: usize) -> Option<&str> {
        self.topics.get(index).and_then(|t| t.as_deref())
    }

    /// Indices of slots that have no topic configured.
    pub fn missing(&self) -> impl Iterator<Item = usize> + '_ {
        self.topics
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_none())
            .map(|(i, _)| i)
    }

    /// Reverse-maps a base topic to its point index. First slot wins on duplicates.
    pub fn lookup_index(&self, topic: &str) -> Option<usize> {
        self.topics
            .iter()
            .position(|t| t.as_deref() == Some(topic))
    }

    /// MQTT topic filters to subscribe to for every configured point.
    pub fn subscriptions(&self, layout: TopicLayout) -> Vec<String> {
        let mut filters = Vec::new();
        for topic in self.topics.iter().flatten() {
            match layout {
                TopicLayout::Split => {
                    for kind in layout.kinds() {
                        filters.push(format!("{topic}/{}", kind.suffix()));
                    }
                }
                TopicLayout::Direct => filters.push(topic.clone()),
            }
        }
        filters
    }

    /// Resolves an inbound topic to the point and reading kind it feeds.
    pub fn route(&self, layout: TopicLayout, topic: &str) -> Option<(usize, ReadingKind)> {
        match layout {
            TopicLayout::Split => {
                let (base, suffix) = topic.rsplit_once('/')?;
                let kind = ReadingKind::from_suffix(suffix)?;
                self.lookup_index(base).map(|index| (index, kind))
            }
            TopicLayout::Direct => self
                .lookup_index(topic)
                .map(|index| (index, ReadingKind::Temperature)),
        }
    }
}
