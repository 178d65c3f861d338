use prometheus::proto::{Gauge, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, TextEncoder};

use crate::error::Result;

/// A gauge family with a fixed label set, filled sample by sample during one
/// collection pass.
///
/// Every call to [`GaugeFamily::add`] yields its own sample, even when the
/// label values repeat an earlier one.
pub struct GaugeFamily {
    name: String,
    help: String,
    labels: Vec<String>,
    samples: Vec<Metric>,
}

impl GaugeFamily {
    pub fn new(namespace: &str, name: &str, help: &str, labels: &[&str]) -> Result<Self> {
        let name = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}_{name}")
        };
        if !is_valid_name(&name) {
            return Err(prometheus::Error::Msg(format!("Invalid metric name: {name:?}")).into());
        }

        Ok(Self {
            name,
            help: help.to_string(),
            labels: labels.iter().map(ToString::to_string).collect(),
            samples: Vec::new(),
        })
    }

    /// Records one sample. `labels` must follow the order given to [`GaugeFamily::new`].
    pub fn add(&mut self, labels: &[&str], value: f64) -> Result<()> {
        if labels.len() != self.labels.len() {
            return Err(prometheus::Error::InconsistentCardinality {
                expect: self.labels.len(),
                got: labels.len(),
            }
            .into());
        }

        let mut pairs: Vec<LabelPair> = self
            .labels
            .iter()
            .zip(labels)
            .map(|(name, value)| {
                let mut pair = LabelPair::default();
                pair.set_name(name.clone());
                pair.set_value((*value).to_string());
                pair
            })
            .collect();
        pairs.sort_by(|a, b| a.name().cmp(b.name()));

        let mut gauge = Gauge::default();
        gauge.set_value(value);

        let mut sample = Metric::default();
        sample.set_label(pairs);
        sample.set_gauge(gauge);
        self.samples.push(sample);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_family(self) -> MetricFamily {
        let mut family = MetricFamily::default();
        family.set_name(self.name);
        family.set_help(self.help);
        family.set_field_type(MetricType::GAUGE);
        family.set_metric(self.samples);
        family
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Turns the gauge families of one collector into metric families.
///
/// Families without samples are dropped; the text encoder rejects them.
pub fn families<I>(gauges: I) -> Vec<MetricFamily>
where
    I: IntoIterator<Item = GaugeFamily>,
{
    gauges
        .into_iter()
        .filter(|gauge| !gauge.is_empty())
        .map(GaugeFamily::into_family)
        .collect()
}

/// Renders metric families in the Prometheus text exposition format.
pub fn encode_text(families: &[MetricFamily]) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
