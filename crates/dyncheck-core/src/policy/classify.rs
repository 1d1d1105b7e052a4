// # Record Classification
//
// Record identifiers returned by the provider's record listing look like
//
//   /REST/ARecord/example.com/www.example.com/123456
//   /REST/CNAMERecord/example.com/cdn.example.com/123457
//
// The kind segment alone decides whether a record is worth a detail fetch.
// Classification never looks at record content.

/// Kind of a listed record, as far as TTL policy is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// IPv4 address record
    Address,
    /// Alias (CNAME) record
    Alias,
    /// Anything else; skipped without a detail fetch
    Other,
}

impl RecordKind {
    /// Whether records of this kind are fetched and evaluated
    pub fn is_inspected(self) -> bool {
        !matches!(self, RecordKind::Other)
    }
}

/// Structured view over a record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPath<'a> {
    /// Classified kind
    pub kind: RecordKind,
    /// Raw kind segment (e.g. `ARecord`, `MXRecord`)
    pub kind_segment: &'a str,
    /// Owning zone
    pub zone: &'a str,
    /// Fully-qualified record name
    pub fqdn: &'a str,
    /// Provider record id
    pub id: &'a str,
}

impl<'a> RecordPath<'a> {
    /// Parse a record identifier
    ///
    /// Returns `None` when the identifier does not have the
    /// `[/REST]/<Kind>Record/<zone>/<fqdn>/<numeric id>` shape.
    pub fn parse(path: &'a str) -> Option<Self> {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.first() == Some(&"REST") {
            segments.remove(0);
        }

        let &[kind_segment, zone, fqdn, id] = segments.as_slice() else {
            return None;
        };

        let kind_name = kind_segment.strip_suffix("Record")?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let kind = match kind_name {
            "A" => RecordKind::Address,
            "CNAME" => RecordKind::Alias,
            _ => RecordKind::Other,
        };

        Some(Self {
            kind,
            kind_segment,
            zone,
            fqdn,
            id,
        })
    }
}

/// Classify a record identifier; malformed identifiers are [`RecordKind::Other`]
pub fn classify(path: &str) -> RecordKind {
    RecordPath::parse(path)
        .map(|p| p.kind)
        .unwrap_or(RecordKind::Other)
}
