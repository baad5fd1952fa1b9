//! Reading runner XML reports into a [`TestRun`]
//!
//! Reports are located under a base directory with a comma-separated glob
//! mask. Each matched file is parsed with a streaming reader; suites that
//! reference a split output file through `src` are replaced by that file's
//! root suite.

use crate::error::{Error, Result};
use crate::model::case::time_difference;
use crate::model::{CaseResult, CaseStatus, Stat, SuiteResult, TestRun};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Tags that mark a test as non-critical.
const NONCRITICAL_TAGS: &[&str] = &["noncritical", "robot:noncritical"];

/// Elements whose bodies are recorded in the execution narrative.
const BODY_ELEMENTS: &[&[u8]] = &[
    b"kw", b"for", b"iter", b"if", b"branch", b"try", b"while", b"group", b"setup", b"teardown",
];

/// Parses every report under `base` matching `mask` into one untallied run.
pub struct ReportParser {
    base: PathBuf,
    mask: String,
}

impl ReportParser {
    pub fn new(base: impl Into<PathBuf>, mask: impl Into<String>) -> Self {
        ReportParser {
            base: base.into(),
            mask: mask.into(),
        }
    }

    fn glob_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in self.mask.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
        }
        Ok(builder.build()?)
    }

    /// Report files matching the mask, relative to the base directory and
    /// sorted by path.
    pub fn matching_files(&self) -> Result<Vec<PathBuf>> {
        let globs = self.glob_set()?;
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.base).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.base) else {
                continue;
            };
            if globs.is_match(relative) {
                files.push(relative.to_path_buf());
            }
        }
        if files.is_empty() {
            return Err(Error::NoReportsFound {
                base: self.base.clone(),
                mask: self.mask.clone(),
            });
        }
        Ok(files)
    }

    /// Parse and merge all matching reports.
    ///
    /// Top-level suites of later files are added after earlier ones, renamed
    /// on collision. The generation timestamp of the last file wins.
    pub fn parse(&self) -> Result<TestRun> {
        let mut run = TestRun::new();
        for relative in self.matching_files()? {
            let path = self.base.join(&relative);
            debug!(file = %path.display(), "parsing report");
            let parsed = parse_report_file(&path)?;
            if let Some(timestamp) = parsed.timestamp() {
                run.set_timestamp(timestamp.to_string());
            }
            if !parsed.report_statistics().is_empty() {
                run.set_report_statistics(parsed.report_statistics().to_vec());
            }
            for suite in parsed.into_suites() {
                run.add_suite(suite);
            }
        }
        Ok(run)
    }
}

/// Parse a single report file. Split outputs resolve relative to its directory.
pub fn parse_report_file(path: &Path) -> Result<TestRun> {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut doc = XmlDocument::open(path, dir)?;
    doc.parse_run()
}

/// Outcome and timing read from a `<status>` element.
struct Status {
    outcome: CaseStatus,
    critical: Option<bool>,
    start: Option<String>,
    end: Option<String>,
    elapsed: Option<u64>,
    message: String,
}

impl Status {
    fn from_attribute(value: &str) -> CaseStatus {
        match value {
            "PASS" => CaseStatus::Passed,
            "SKIP" | "NOT RUN" | "NOT_RUN" => CaseStatus::Skipped,
            _ => CaseStatus::Failed,
        }
    }

    /// Elapsed milliseconds when the status carries usable timing.
    fn duration(&self) -> Option<u64> {
        if self.elapsed.is_some() {
            return self.elapsed;
        }
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => time_difference(start, end),
            _ => None,
        }
    }
}

struct XmlDocument {
    path: PathBuf,
    dir: PathBuf,
    reader: Reader<BufReader<File>>,
    buf: Vec<u8>,
}

impl XmlDocument {
    fn open(path: &Path, dir: PathBuf) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::xml(path, e))?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.trim_text(true);
        reader.expand_empty_elements(true);
        Ok(XmlDocument {
            path: path.to_path_buf(),
            dir,
            reader,
            buf: Vec::new(),
        })
    }

    fn next(&mut self) -> Result<Event<'static>> {
        self.buf.clear();
        let event = self
            .reader
            .read_event_into(&mut self.buf)
            .map_err(|e| Error::xml(&self.path, e))?
            .into_owned();
        if let Event::DocType(ref text) = event {
            if String::from_utf8_lossy(text).contains("<!ENTITY") {
                return Err(Error::ExternalEntity(self.path.clone()));
            }
        }
        Ok(event)
    }

    fn unexpected_eof(&self, element: &str) -> Error {
        Error::xml(
            &self.path,
            format!("unexpected end of file inside <{}>", element),
        )
    }

    /// Consume the rest of an element that was just started.
    fn skip(&mut self, start: &BytesStart) -> Result<()> {
        self.buf.clear();
        self.reader
            .read_to_end_into(start.name(), &mut self.buf)
            .map_err(|e| Error::xml(&self.path, e))?;
        Ok(())
    }

    fn attribute(&self, start: &BytesStart, key: &[u8]) -> Result<Option<String>> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::xml(&self.path, e))?;
            if attr.key.local_name().as_ref() == key {
                let value = attr
                    .unescape_value()
                    .map_err(|e| Error::xml(&self.path, e))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn count_attribute(&self, start: &BytesStart, key: &[u8]) -> Result<u64> {
        match self.attribute(start, key)? {
            None => Ok(0),
            Some(value) => value.trim().parse().map_err(|_| {
                Error::xml(
                    &self.path,
                    format!(
                        "invalid {} count '{}'",
                        String::from_utf8_lossy(key),
                        value
                    ),
                )
            }),
        }
    }

    /// Text content of the current element; nested elements are ignored.
    fn read_text(&mut self, element: &str) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next()? {
                Event::Text(t) => {
                    let value = t.unescape().map_err(|e| Error::xml(&self.path, e))?;
                    text.push_str(&value);
                }
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(text),
                Event::Eof => return Err(self.unexpected_eof(element)),
                _ => {}
            }
        }
    }

    /// Parse a whole report. The document must hold exactly one `<robot>`
    /// element, closed before the end of the file.
    fn parse_run(&mut self) -> Result<TestRun> {
        let mut run = None;
        loop {
            match self.next()? {
                Event::Start(e) => {
                    if run.is_some() {
                        return Err(Error::xml(&self.path, "more than one root element"));
                    }
                    if e.local_name().as_ref() != b"robot" {
                        return Err(Error::xml(
                            &self.path,
                            format!(
                                "expected <robot> root element, found <{}>",
                                String::from_utf8_lossy(e.local_name().as_ref())
                            ),
                        ));
                    }
                    run = Some(self.parse_robot(&e)?);
                }
                Event::Text(t) if !t.iter().all(u8::is_ascii_whitespace) => {
                    return Err(Error::xml(&self.path, "text outside the root element"));
                }
                Event::CData(_) | Event::End(_) => {
                    return Err(Error::xml(&self.path, "content outside the root element"));
                }
                Event::Eof => {
                    return run.ok_or_else(|| Error::xml(&self.path, "no root element found"));
                }
                _ => {}
            }
        }
    }

    fn parse_robot(&mut self, start: &BytesStart) -> Result<TestRun> {
        let mut run = TestRun::new();
        if let Some(generated) = self.attribute(start, b"generated")? {
            run.set_timestamp(generated);
        }
        loop {
            match self.next()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"suite" => {
                        let suite = self.parse_suite(&e)?;
                        run.add_suite(suite);
                    }
                    b"statistics" => {
                        let stats = self.parse_statistics()?;
                        run.set_report_statistics(stats);
                    }
                    _ => self.skip(&e)?,
                },
                Event::End(_) => return Ok(run),
                Event::Eof => return Err(self.unexpected_eof("robot")),
                _ => {}
            }
        }
    }

    /// Root suite of a split output file.
    fn first_suite(&mut self) -> Result<SuiteResult> {
        loop {
            match self.next()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"robot" => {}
                    b"suite" => return self.parse_suite(&e),
                    _ => self.skip(&e)?,
                },
                Event::Eof => {
                    return Err(Error::xml(&self.path, "no <suite> element found"));
                }
                _ => {}
            }
        }
    }

    fn parse_suite(&mut self, start: &BytesStart) -> Result<SuiteResult> {
        let name = self.attribute(start, b"name")?.unwrap_or_default();

        if let Some(src) = self.attribute(start, b"src")? {
            self.skip(start)?;
            let split_path = self.dir.join(&src);
            debug!(file = %split_path.display(), suite = %name, "reading split output");
            let mut split = XmlDocument::open(&split_path, self.dir.clone())?;
            let mut suite = split.first_suite()?;
            if suite.name().is_empty() && !name.is_empty() {
                suite.set_name(name);
            }
            return Ok(suite);
        }

        let mut suite = SuiteResult::new(name);
        if let Some(source) = self.attribute(start, b"source")? {
            suite = suite.with_source(source);
        }
        loop {
            match self.next()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"suite" => {
                        let child = self.parse_suite(&e)?;
                        suite.add_child(child);
                    }
                    b"test" => {
                        let case = self.parse_test(&e)?;
                        suite.add_case(case);
                    }
                    b"doc" => {
                        let doc = self.read_text("doc")?;
                        if !doc.is_empty() {
                            suite.set_description(doc);
                        }
                    }
                    b"status" => {
                        let status = self.parse_status(&e)?;
                        suite.set_explicit_duration(status.duration());
                    }
                    _ => self.skip(&e)?,
                },
                Event::End(_) => return Ok(suite),
                Event::Eof => return Err(self.unexpected_eof("suite")),
                _ => {}
            }
        }
    }

    fn parse_status(&mut self, start: &BytesStart) -> Result<Status> {
        let outcome = self
            .attribute(start, b"status")?
            .map(|s| Status::from_attribute(s.trim()))
            .unwrap_or(CaseStatus::Failed);
        let critical = self.attribute(start, b"critical")?.map(|c| c == "yes");
        let elapsed = match self.attribute(start, b"elapsed")? {
            Some(value) => match value.trim().parse::<f64>() {
                Ok(secs) if secs.is_finite() => Some((secs * 1000.0).round().max(0.0) as u64),
                _ => {
                    warn!(file = %self.path.display(), elapsed = %value, "Unable to parse elapsed time");
                    Some(0)
                }
            },
            None => None,
        };
        let start_time = match self.attribute(start, b"starttime")? {
            Some(value) => Some(value),
            None => self.attribute(start, b"start")?,
        };
        let end_time = self.attribute(start, b"endtime")?;
        let message = self.read_text("status")?;
        Ok(Status {
            outcome,
            critical,
            start: start_time,
            end: end_time,
            elapsed,
            message,
        })
    }

    fn parse_test(&mut self, start: &BytesStart) -> Result<CaseResult> {
        let name = self.attribute(start, b"name")?.unwrap_or_default();
        let test_critical = self.attribute(start, b"critical")?.map(|c| c == "yes");

        let mut description = None;
        let mut tags = Vec::new();
        let mut status = None;
        let mut trace = Vec::new();
        loop {
            match self.next()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"doc" => description = Some(self.read_text("doc")?),
                    b"tags" => self.parse_tags(&mut tags)?,
                    b"tag" => tags.push(self.read_text("tag")?),
                    b"status" => status = Some(self.parse_status(&e)?),
                    tag if BODY_ELEMENTS.contains(&tag) => {
                        self.parse_body_item(&e, 0, &mut trace)?;
                    }
                    _ => self.skip(&e)?,
                },
                Event::End(_) => break,
                Event::Eof => return Err(self.unexpected_eof("test")),
                _ => {}
            }
        }

        let status = status.unwrap_or(Status {
            outcome: CaseStatus::Failed,
            critical: None,
            start: None,
            end: None,
            elapsed: None,
            message: String::new(),
        });

        let noncritical_tag = tags
            .iter()
            .any(|t| NONCRITICAL_TAGS.iter().any(|n| t.eq_ignore_ascii_case(n)));
        let critical = status
            .critical
            .or(noncritical_tag.then_some(false))
            .or(test_critical)
            .unwrap_or(true);

        let mut case = CaseResult::passed(name)
            .with_outcome(status.outcome)
            .with_critical(critical);
        if let Some(description) = description.filter(|d| !d.is_empty()) {
            case = case.with_description(description);
        }
        for tag in tags {
            case = case.with_tag(tag);
        }
        if !status.message.is_empty() {
            case = case.with_error(status.message.clone());
        }
        if let Some(elapsed) = status.elapsed {
            case = case.with_duration(elapsed);
        } else if let (Some(start), Some(end)) = (status.start, status.end) {
            case = case.with_times(start, end);
        }
        if case.is_failed() && !trace.is_empty() {
            case = case.with_stack_trace(trace.join("\n"));
        }
        Ok(case)
    }

    fn parse_tags(&mut self, tags: &mut Vec<String>) -> Result<()> {
        loop {
            match self.next()? {
                Event::Start(e) if e.local_name().as_ref() == b"tag" => {
                    tags.push(self.read_text("tag")?);
                }
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(self.unexpected_eof("tags")),
                _ => {}
            }
        }
    }

    /// Record a keyword or control structure as indented narrative lines.
    fn parse_body_item(
        &mut self,
        start: &BytesStart,
        depth: usize,
        trace: &mut Vec<String>,
    ) -> Result<()> {
        let element = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let label = match self.attribute(start, b"name")? {
            Some(name) if element == "kw" => name,
            Some(name) => format!("{} {}", element.to_uppercase(), name),
            None => match self.attribute(start, b"type")? {
                Some(kind) => kind.to_uppercase(),
                None => element.to_uppercase(),
            },
        };
        let indent = "  ".repeat(depth);
        let mut args = Vec::new();
        let mut children = Vec::new();
        loop {
            match self.next()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"arguments" => self.parse_arguments(&mut args)?,
                    b"arg" | b"var" | b"value" => args.push(self.read_text("arg")?),
                    b"msg" => {
                        let level = self.attribute(&e, b"level")?;
                        let text = self.read_text("msg")?;
                        if level.as_deref() == Some("FAIL") {
                            children.push(format!("{}  FAIL {}", indent, text));
                        }
                    }
                    tag if BODY_ELEMENTS.contains(&tag) => {
                        self.parse_body_item(&e, depth + 1, &mut children)?;
                    }
                    _ => self.skip(&e)?,
                },
                Event::End(_) => break,
                Event::Eof => return Err(self.unexpected_eof(&element)),
                _ => {}
            }
        }
        let mut line = format!("{}{}", indent, label);
        for arg in &args {
            line.push_str("    ");
            line.push_str(arg);
        }
        trace.push(line);
        trace.append(&mut children);
        Ok(())
    }

    fn parse_arguments(&mut self, args: &mut Vec<String>) -> Result<()> {
        loop {
            match self.next()? {
                Event::Start(e) if e.local_name().as_ref() == b"arg" => {
                    args.push(self.read_text("arg")?);
                }
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(self.unexpected_eof("arguments")),
                _ => {}
            }
        }
    }

    fn parse_statistics(&mut self) -> Result<Vec<Stat>> {
        let mut stats = Vec::new();
        loop {
            match self.next()? {
                Event::Start(e) if e.local_name().as_ref() == b"total" => {
                    stats = self.parse_total()?;
                }
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(stats),
                Event::Eof => return Err(self.unexpected_eof("statistics")),
                _ => {}
            }
        }
    }

    fn parse_total(&mut self) -> Result<Vec<Stat>> {
        let mut stats = Vec::new();
        loop {
            match self.next()? {
                Event::Start(e) if e.local_name().as_ref() == b"stat" => {
                    let pass = self.count_attribute(&e, b"pass")?;
                    let fail = self.count_attribute(&e, b"fail")?;
                    let skip = self.count_attribute(&e, b"skip")?;
                    let label = self.read_text("stat")?;
                    stats.push(Stat {
                        label: (!label.is_empty()).then_some(label),
                        pass,
                        fail,
                        skip,
                    });
                }
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(stats),
                Event::Eof => return Err(self.unexpected_eof("total")),
                _ => {}
            }
        }
    }
}
