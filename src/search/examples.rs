//! Bundled example documents for trying the assistant without papers.

use crate::core::paper::{Document, DocumentMetadata, Section};

struct Example {
    file_name: &'static str,
    title: &'static str,
    section: Section,
    authors: [&'static str; 2],
    content: &'static str,
}

fn examples() -> [Example; 3] {
    [
        Example {
            file_name: "example-high-voltage.pdf",
            title: "High Voltage Electrolyte for Li-ion Batteries",
            section: Section::Abstract,
            authors: ["John Doe", "Jane Smith"],
            content: "High voltage electrolytes are crucial for next-generation lithium-ion batteries. \
                      We developed an electrolyte with 1.2 M LiPF6 in FEC/EMC (3:7) that exhibits \
                      excellent stability up to 4.8V. The Coulombic efficiency reached 99.7% and \
                      ionic conductivity was 11.5 mS cm⁻¹. This formulation shows great promise \
                      for high-energy-density batteries.",
        },
        Example {
            file_name: "example-vc-sei.pdf",
            title: "SEI Formation with VC Additive",
            section: Section::Results,
            authors: ["Alice Johnson", "Bob Wilson"],
            content: "Solid electrolyte interphase (SEI) formation is critical for battery performance. \
                      Using 2 wt% VC additive in 1M LiPF6/EC-DEC electrolyte significantly improves \
                      SEI stability. The cycling performance shows 95% capacity retention after \
                      500 cycles at 1C rate. The interface characterization reveals uniform SEI layer. \
                      This electrolyte formulation provides excellent Coulombic efficiency of 99.5%.",
        },
        Example {
            file_name: "example-lifsi-metal.pdf",
            title: "LiFSI Electrolytes for Li Metal Batteries",
            section: Section::Conclusion,
            authors: ["Charlie Brown", "Diana Lee"],
            content: "Lithium metal batteries require electrolytes with high Li+ transference number. \
                      We studied LiFSI-based electrolytes in ether solvents. The transference number \
                      reached 0.78, with ionic conductivity of 8.9 mS cm⁻¹. Coulombic efficiency \
                      was maintained at 99.3% over 200 cycles in Li||Cu cells. The electrolyte \
                      composition was 1 M LiFSI in DME/DOL (1:1) with LiNO3 additive.",
        },
    ]
}

/// The three example documents, with formulations and metrics extracted.
pub fn example_documents() -> Vec<Document> {
    examples()
        .into_iter()
        .map(|ex| {
            Document::new(
                Document::document_id(ex.file_name, &ex.section, 0),
                ex.content,
                DocumentMetadata {
                    file_name: ex.file_name.to_string(),
                    section: ex.section,
                    title: ex.title.to_string(),
                    authors: ex.authors.iter().map(|a| a.to_string()).collect(),
                    formulations: Vec::new(),
                    metrics: Default::default(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_carry_extracted_data() {
        let docs = example_documents();
        assert_eq!(docs.len(), 3);

        let high_voltage = &docs[0].metadata;
        assert_eq!(high_voltage.metrics.coulombic_efficiency, Some(99.7));
        assert_eq!(high_voltage.metrics.ionic_conductivity, Some(11.5));
        assert_eq!(high_voltage.metrics.voltage_window, Some(4.8));
        assert!(high_voltage
            .formulations
            .iter()
            .any(|f| f.component == "LiPF6" && f.concentration == "1.2 M"));

        let sei = &docs[1].metadata;
        assert_eq!(sei.metrics.coulombic_efficiency, Some(99.5));
        assert_eq!(sei.metrics.cycle_life, Some(500.0));
        assert!(sei.formulations.iter().any(|f| f.component == "VC" && f.concentration == "2 wt%"));

        let metal = &docs[2].metadata;
        assert_eq!(metal.metrics.coulombic_efficiency, Some(99.3));
        assert_eq!(metal.metrics.ionic_conductivity, Some(8.9));
        assert!(metal.formulations.iter().any(|f| f.component == "LiFSI"));
        assert_eq!(docs[2].id, "example-lifsi-metal.pdf#conclusion#0");
    }
}
