//! Terminal output formatter

use docmeta_core::{ExtractedRecord, ScanResult};
use std::fmt::Display;

fn line(output: &mut String, label: &str, value: Option<impl Display>) {
    if let Some(value) = value {
        output.push_str(&format!("{:<22} {}\n", format!("{}:", label), value));
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn format_record(record: Option<&ExtractedRecord>) -> String {
    let Some(r) = record else {
        return "No metadata could be extracted\n".to_string();
    };

    let mut output = String::new();
    line(&mut output, "Backend", Some(&r.backend));
    line(&mut output, "DOI", r.doi.as_ref());
    line(&mut output, "Title", r.title.as_ref());
    line(&mut output, "Type", r.document_type);
    line(&mut output, "Year", r.year);
    line(&mut output, "Internal authors", r.internal_authors.as_ref().map(|a| a.join(", ")));
    line(&mut output, "External authors", r.external_authors.as_ref().map(|a| a.join(", ")));
    line(
        &mut output,
        "External principal",
        r.is_external_principal_author.map(yes_no),
    );
    line(&mut output, "International", r.is_international.map(yes_no));
    line(
        &mut output,
        "External origins",
        r.origin_external_authors.as_ref().map(|origins| {
            origins
                .iter()
                .map(|o| format!("{} ({})", o.institution, o.place))
                .collect::<Vec<_>>()
                .join("; ")
        }),
    );
    line(&mut output, "Editorial", r.editorial.as_ref());
    line(&mut output, "Country", r.country_published.as_ref());
    line(
        &mut output,
        "Identifiers",
        r.identifiers
            .as_ref()
            .map(|pair| format!("{} (electronic, print): {}", pair.kind.label(), pair)),
    );
    line(&mut output, "URL", r.url.as_ref().map(|u| &u.value));
    line(&mut output, "Science network", r.science_network.as_ref());
    line(
        &mut output,
        "Funders",
        r.founders.as_ref().map(|funders| {
            funders
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        }),
    );
    line(&mut output, "Dissemination", r.means_of_dissemination);
    line(
        &mut output,
        "Report area",
        r.report_area
            .as_ref()
            .map(|a| format!("{} / {}", a.area, a.subarea)),
    );
    output
}

pub fn format_scan(results: &[ScanResult]) -> String {
    let mut output = String::new();
    for result in results {
        let status = match (&result.record, &result.error) {
            (_, Some(error)) => format!("failed: {}", error),
            (Some(record), None) => record
                .title
                .clone()
                .unwrap_or_else(|| format!("({} backend, untitled)", record.backend)),
            (None, None) => "no metadata".to_string(),
        };
        output.push_str(&format!("{}\t{}\n", result.path.display(), status));
    }
    output
}
