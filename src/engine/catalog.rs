//! Pre-authored topic catalog.
//!
//! Curated research briefs served without touching the scrape pipeline.
//! Lookup by normalized topic name is the routing boundary: a catalog hit
//! answers immediately, everything else goes through the orchestrator.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentCount {
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeGap {
    pub area: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionableInsight {
    pub audience: String,
    pub recommendation: String,
}

/// One element of the knowledge graph. Tagged so consumers never have to
/// sniff for the presence of source/target keys.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphElement {
    Node { id: String, label: String },
    Edge { source: String, target: String },
}

fn node(id: &str, label: &str) -> GraphElement {
    GraphElement::Node {
        id: id.to_string(),
        label: label.to_string(),
    }
}

fn edge(source: &str, target: &str) -> GraphElement {
    GraphElement::Edge {
        source: source.to_string(),
        target: target.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicRecord {
    pub topic: String,
    pub summary: String,
    pub experiments: Vec<ExperimentCount>,
    pub knowledge_gaps: Vec<KnowledgeGap>,
    pub actionable: Vec<ActionableInsight>,
    pub graph_elements: Vec<GraphElement>,
}

pub struct TopicCatalog {
    topics: Vec<TopicRecord>,
}

impl TopicCatalog {
    pub fn builtin() -> Self {
        Self {
            topics: vec![radiation(), sleep(), plants()],
        }
    }

    /// Case-insensitive lookup by topic name.
    pub fn lookup(&self, term: &str) -> Option<&TopicRecord> {
        let normalized = term.trim().to_lowercase();
        self.topics.iter().find(|t| t.topic == normalized)
    }

    pub fn topic_names(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.topic.clone()).collect()
    }
}

fn experiments(rows: &[(&str, u32)]) -> Vec<ExperimentCount> {
    rows.iter()
        .map(|(label, count)| ExperimentCount {
            label: label.to_string(),
            count: *count,
        })
        .collect()
}

fn gaps(rows: &[(&str, u32)]) -> Vec<KnowledgeGap> {
    rows.iter()
        .map(|(area, weight)| KnowledgeGap {
            area: area.to_string(),
            weight: *weight,
        })
        .collect()
}

fn insights(rows: &[(&str, &str)]) -> Vec<ActionableInsight> {
    rows.iter()
        .map(|(audience, recommendation)| ActionableInsight {
            audience: audience.to_string(),
            recommendation: recommendation.to_string(),
        })
        .collect()
}

fn radiation() -> TopicRecord {
    TopicRecord {
        topic: "radiation".to_string(),
        summary: "Exposure to cosmic radiation results in significant DNA damage in plant and \
                  animal models. Studies on the ISS have identified several repair mechanisms, \
                  though long-term effects, particularly for Mars missions, remain a key \
                  concern. Key genes like RAD51 and p53 are consistently upregulated."
            .to_string(),
        experiments: experiments(&[
            ("Arabidopsis", 18),
            ("Mice", 12),
            ("Yeast", 9),
            ("Human Cells", 7),
        ]),
        knowledge_gaps: gaps(&[
            ("Known Effects", 60),
            ("Countermeasures", 25),
            ("Long-Term Impact", 15),
        ]),
        actionable: insights(&[
            (
                "Mission Architects",
                "Shielding for transport vehicles and habitats is critical. Consider routes \
                 that minimize exposure to solar particle events.",
            ),
            (
                "Scientists",
                "Focus on developing radioprotective supplements and gene therapies. More \
                 research is needed on the combined effects of radiation and microgravity.",
            ),
            (
                "Managers",
                "Prioritize funding for projects investigating countermeasures and real-time \
                 radiation monitoring technologies for crew safety.",
            ),
        ]),
        graph_elements: vec![
            node("rad", "Radiation"),
            node("dna", "DNA Damage"),
            node("repair", "Gene Repair Mech."),
            node("cancer", "Cancer Risk"),
            node("counter", "Countermeasures"),
            node("mars", "Mars Mission Viability"),
            edge("rad", "dna"),
            edge("dna", "repair"),
            edge("dna", "cancer"),
            edge("repair", "counter"),
            edge("cancer", "counter"),
            edge("counter", "mars"),
        ],
    }
}

fn sleep() -> TopicRecord {
    TopicRecord {
        topic: "sleep".to_string(),
        summary: "Sleep disruption in microgravity is a persistent issue, primarily linked to \
                  circadian rhythm desynchronization and environmental factors. Studies show a \
                  decrease in slow-wave sleep, impacting cognitive performance. Light therapy \
                  and optimized scheduling are promising countermeasures."
            .to_string(),
        experiments: experiments(&[("Humans", 25), ("Rodents", 8)]),
        knowledge_gaps: gaps(&[
            ("Circadian Rhythm", 50),
            ("Cognitive Impact", 30),
            ("Pharmacology", 20),
        ]),
        actionable: insights(&[
            (
                "Mission Architects",
                "Design crew quarters with dynamic lighting systems to simulate a 24-hour \
                 cycle. Improve acoustic insulation.",
            ),
            (
                "Scientists",
                "Investigate non-pharmacological interventions like meditation and \
                 personalized exercise regimes to improve sleep quality.",
            ),
            (
                "Managers",
                "Fund development of wearable technology to monitor crew sleep patterns and \
                 cognitive readiness in real-time.",
            ),
        ]),
        graph_elements: vec![
            node("microg", "Microgravity"),
            node("circ", "Circadian Desync"),
            node("sleep", "Poor Sleep Quality"),
            node("cog", "Cognitive Decline"),
            node("perf", "Mission Performance"),
            node("light", "Light Therapy"),
            edge("microg", "circ"),
            edge("circ", "sleep"),
            edge("sleep", "cog"),
            edge("cog", "perf"),
            edge("light", "sleep"),
        ],
    }
}

fn plants() -> TopicRecord {
    TopicRecord {
        topic: "plants".to_string(),
        summary: "Cultivating plants in space is crucial for long-duration missions, providing \
                  nutrition, oxygen, and psychological benefits. Research focuses on optimizing \
                  growth in microgravity, where altered root behavior and fluid dynamics pose \
                  challenges. LED lighting and hydroponic systems are key technologies being \
                  refined on the ISS."
            .to_string(),
        experiments: experiments(&[
            ("Lettuce", 22),
            ("Radishes", 15),
            ("Chili Peppers", 10),
            ("Arabidopsis", 28),
        ]),
        knowledge_gaps: gaps(&[
            ("Nutrient Uptake", 40),
            ("Pollination", 35),
            ("Light Spectrum", 25),
        ]),
        actionable: insights(&[
            (
                "Mission Architects",
                "Integrate modular 'space gardens' into habitat designs for Mars missions. \
                 Plan for power and water recycling systems.",
            ),
            (
                "Scientists",
                "Develop autonomous systems for monitoring plant health and harvesting. \
                 Research crop varieties that are more resilient to space stressors.",
            ),
            (
                "Managers",
                "Invest in advanced hydroponic and aeroponic technologies to increase crop \
                 yield and reduce resource consumption.",
            ),
        ]),
        graph_elements: vec![
            node("microg", "Microgravity"),
            node("roots", "Altered Root Growth"),
            node("nutrients", "Nutrient Uptake"),
            node("led", "LED Lighting"),
            node("yield", "Crop Yield"),
            node("missions", "Mission Self-Sufficiency"),
            edge("microg", "roots"),
            edge("roots", "nutrients"),
            edge("nutrients", "yield"),
            edge("led", "yield"),
            edge("yield", "missions"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_normalizes_case_and_whitespace() {
        let catalog = TopicCatalog::builtin();
        assert!(catalog.lookup("Radiation").is_some());
        assert!(catalog.lookup("  SLEEP  ").is_some());
        assert!(catalog.lookup("xyzzynotopic123").is_none());
    }

    #[test]
    fn builtin_topics_are_complete_records() {
        let catalog = TopicCatalog::builtin();
        for name in catalog.topic_names() {
            let record = catalog.lookup(&name).unwrap();
            assert!(!record.summary.is_empty());
            assert!(!record.experiments.is_empty());
            assert!(!record.knowledge_gaps.is_empty());
            assert_eq!(record.actionable.len(), 3);
            assert!(record
                .graph_elements
                .iter()
                .any(|e| matches!(e, GraphElement::Edge { .. })));
        }
    }

    #[test]
    fn graph_elements_serialize_tagged() {
        let json = serde_json::to_value(GraphElement::Node {
            id: "rad".to_string(),
            label: "Radiation".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "node");
        let json = serde_json::to_value(GraphElement::Edge {
            source: "a".to_string(),
            target: "b".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "edge");
    }
}
