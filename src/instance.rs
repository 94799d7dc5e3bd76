//! Reading the structural part of an ITC2021 instance: teams, slots and the
//! game mode of the format section.

use std::path::Path;

use log::*;

use crate::error::{self, Error, Result};

pub type TeamId = i64;
pub type SlotId = i64;

/// Reads an instance file into memory. A missing file gives [`Error::NotFound`].
pub fn load(path: &Path) -> Result<String> {
    info!("Loading xml {:?}", path);
    let xml = error::read_to_string(path)?;
    info!("Loaded {} chars", xml.len());
    Ok(xml)
}

/// Parses a document. Unlike `roxmltree` on its own, a document that ends
/// with elements still open is rejected.
pub fn parse<'input>(xml: &'input str, path: &Path) -> Result<roxmltree::Document<'input>> {
    let xml_error = |source: roxmltree::Error| Error::Xml {
        path: path.to_path_buf(),
        source,
    };
    let doc = roxmltree::Document::parse(xml).map_err(xml_error)?;
    if open_elements(xml) > 0 {
        let end = xmlparser::Error::InvalidElement(xmlparser::StreamError::UnexpectedEndOfStream, end_pos(xml));
        return Err(xml_error(roxmltree::Error::ParserError(end)));
    }
    Ok(doc)
}

/// Elements opened but not closed by the end of the text.
fn open_elements(xml: &str) -> usize {
    let mut depth = 0usize;
    for token in xmlparser::Tokenizer::from(xml) {
        match token {
            Ok(xmlparser::Token::ElementEnd { end: xmlparser::ElementEnd::Open, .. }) => depth += 1,
            Ok(xmlparser::Token::ElementEnd { end: xmlparser::ElementEnd::Close(..), .. }) => {
                depth = depth.saturating_sub(1)
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
    depth
}

fn end_pos(xml: &str) -> xmlparser::TextPos {
    let row = xml.matches('\n').count() + 1;
    let col = xml.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    xmlparser::TextPos::new(row as u32, col as u32)
}

/// First element with the given tag name anywhere below (or at) `node`, in document order.
pub fn find<'a, 'input>(node: roxmltree::Node<'a, 'input>, name: &str) -> Option<roxmltree::Node<'a, 'input>> {
    node.descendants().find(|n| n.is_element() && n.has_tag_name(name))
}

/// First child element with the given tag name.
pub fn child<'a, 'input>(node: roxmltree::Node<'a, 'input>, name: &str) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|n| n.is_element() && n.has_tag_name(name))
}

/// An ordered set of integer identifiers (teams or slots).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    pub ids: Vec<i64>,
}

impl Universe {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn max(&self) -> Option<i64> {
        self.ids.iter().copied().max()
    }

    /// The identifiers are exactly `0, 1, ..., n-1` in some order.
    pub fn is_contiguous(&self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        let mut sorted = self.ids.clone();
        sorted.sort_unstable();
        sorted.iter().zip(0i64..).all(|(id, expected)| *id == expected)
    }
}

/// Teams, slots and format of an instance. `None` means the section is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub teams: Option<Universe>,
    pub slots: Option<Universe>,
    pub phased: bool,
}

impl Structure {
    pub fn read(doc: &roxmltree::Document) -> Result<Structure> {
        let root = doc.root();
        let teams = find(root, "Teams").map(|n| read_ids(n, "team")).transpose()?;
        let slots = find(root, "Slots").map(|n| read_ids(n, "slot")).transpose()?;

        // Phased tournaments play every pairing once in each half.
        let phased = find(root, "Format")
            .and_then(|format| child(format, "gameMode"))
            .and_then(|mode| mode.text())
            == Some("P");

        if let Some(teams) = teams.as_ref() {
            info!("teams: {:?}", teams.ids);
        }
        if let Some(slots) = slots.as_ref() {
            info!("slots: {:?}", slots.ids);
        }
        info!("PHASED: {}", phased);

        Ok(Structure { teams, slots, phased })
    }
}

fn read_ids(section: roxmltree::Node, element: &str) -> Result<Universe> {
    let mut ids = Vec::new();
    for node in section.children().filter(|n| n.is_element() && n.has_tag_name(element)) {
        let id = node
            .attribute("id")
            .ok_or_else(|| Error::Malformed(format!("<{}> element without id", element)))?;
        let id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::Malformed(format!("<{}> id {:?} is not an integer", element, id)))?;
        ids.push(id);
    }
    Ok(Universe { ids })
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<Instance>
        <Resources>
            <Teams><team id="2" league="0"/><team id="0" league="0"/><team id="1" league="0"/></Teams>
            <Slots><slot id="0"/><slot id="2"/></Slots>
        </Resources>
        <Structure><Format leagueIds="0"><numberRoundRobin>2</numberRoundRobin><gameMode>P</gameMode></Format></Structure>
    </Instance>"#;

    #[test]
    fn reads_structure() {
        let doc = roxmltree::Document::parse(XML).unwrap();
        let s = Structure::read(&doc).unwrap();
        assert_eq!(s.teams.as_ref().unwrap().ids, vec![2, 0, 1]);
        assert!(s.teams.as_ref().unwrap().is_contiguous());
        assert_eq!(s.slots.as_ref().unwrap().ids, vec![0, 2]);
        assert!(!s.slots.as_ref().unwrap().is_contiguous());
        assert!(s.phased);
    }

    #[test]
    fn game_mode_other_than_p_is_not_phased() {
        let xml = XML.replace("<gameMode>P</gameMode>", "<gameMode>NULL</gameMode>");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert!(!Structure::read(&doc).unwrap().phased);

        let doc = roxmltree::Document::parse("<Instance/>").unwrap();
        let s = Structure::read(&doc).unwrap();
        assert!(!s.phased);
        assert_eq!(s.teams, None);
        assert_eq!(s.slots, None);
    }

    #[test]
    fn contiguity() {
        let u = |ids: &[i64]| Universe { ids: ids.to_vec() };
        assert!(u(&[0]).is_contiguous());
        assert!(u(&[0, 1, 2, 3]).is_contiguous());
        assert!(!u(&[1, 2, 3]).is_contiguous());
        assert!(!u(&[0, 1, 1]).is_contiguous());
        assert!(!u(&[0, 2]).is_contiguous());
        assert!(!u(&[]).is_contiguous());
    }

    #[test]
    fn truncated_document_is_rejected() {
        let path = Path::new("in.xml");
        for xml in ["<Instance><Teams>", "<Instance><Teams><team id=\"0\"/>"].iter() {
            match parse(xml, path) {
                Err(Error::Xml { source, .. }) => assert!(source.to_string().contains("end of stream"), "{}", source),
                other => panic!("{:?} parsed as {:?}", xml, other.map(|d| d.descendants().count())),
            }
        }
        assert!(matches!(parse("<Instance>\n  <Teams></Teams>\n", path), Err(Error::Xml { .. })));
        assert!(parse("<Instance><Teams/></Instance>", path).is_ok());
        assert!(parse("<?xml version=\"1.0\"?>\n<!-- c --><Instance><a><b/></a></Instance>\n", path).is_ok());
    }

    #[test]
    fn bad_team_id_is_malformed() {
        let doc = roxmltree::Document::parse(r#"<Instance><Teams><team id="x"/></Teams></Instance>"#).unwrap();
        assert!(matches!(Structure::read(&doc), Err(Error::Malformed(_))));
        let doc = roxmltree::Document::parse(r#"<Instance><Teams><team/></Teams></Instance>"#).unwrap();
        assert!(matches!(Structure::read(&doc), Err(Error::Malformed(_))));
    }
}
