//! Lazy record stream over one input file.
//!
//! A decoder thread drives `serde_json` over a buffered reader with a visitor that forwards each
//! element of the record array on a bounded channel as soon as it is decoded. The file is never
//! held as one document; at most `channel_cap` decoded records wait for the consumer.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

use crate::error::PipelineError;
use crate::utils::config::{Defaults, READ_BUFFER_SIZE, STREAM_CHANNEL_CAP};
use crate::{Record, RechunkOpts};

/// Where to find records and the context hint inside an object-shaped export.
#[derive(Clone, Debug)]
pub struct StreamOpts {
    pub records_field: String,
    pub hint_field: String,
    /// Decoded records buffered ahead of the consumer.
    pub channel_cap: usize,
}

impl Default for StreamOpts {
    fn default() -> Self {
        Self {
            records_field: Defaults::RECORDS_FIELD.to_string(),
            hint_field: Defaults::HINT_FIELD.to_string(),
            channel_cap: STREAM_CHANNEL_CAP,
        }
    }
}

impl From<&RechunkOpts> for StreamOpts {
    fn from(o: &RechunkOpts) -> Self {
        Self {
            records_field: o.records_field.clone(),
            hint_field: o.hint_field.clone(),
            channel_cap: STREAM_CHANNEL_CAP,
        }
    }
}

/// Message from the decoder thread. The hint always comes first, exactly once.
enum StreamEvent {
    Hint(Option<String>),
    Record(Record),
}

type StreamItem = Result<StreamEvent, serde_json::Error>;

/// Forward-only sequence of the records in one file.
///
/// Yields `Err(PipelineError::ChunkRead)` at most once, then ends.
pub struct RecordStream {
    path: PathBuf,
    hint: Option<String>,
    rx: Option<Receiver<StreamItem>>,
    decoder: Option<JoinHandle<()>>,
    yielded: usize,
    done: bool,
}

impl RecordStream {
    /// Open `path` and decode up to the context hint (or the start of the records).
    ///
    /// Fails with [`PipelineError::Read`] when the file cannot be opened or is not an array or
    /// object before that point.
    pub fn open(path: &Path, opts: &StreamOpts) -> Result<Self, PipelineError> {
        let file = File::open(path).map_err(|e| PipelineError::read(path, e))?;
        let (tx, rx) = bounded::<StreamItem>(opts.channel_cap.max(1));
        let fields = (opts.records_field.clone(), opts.hint_field.clone());
        let decoder = thread::Builder::new()
            .name("record-decoder".to_string())
            .spawn(move || decode_document(file, fields, tx))
            .map_err(|e| PipelineError::read(path, e))?;

        let mut stream = RecordStream {
            path: path.to_path_buf(),
            hint: None,
            rx: Some(rx),
            decoder: Some(decoder),
            yielded: 0,
            done: false,
        };
        match stream.recv() {
            Some(Ok(StreamEvent::Hint(hint))) => stream.hint = hint,
            Some(Ok(StreamEvent::Record(_))) => {
                return Err(PipelineError::read(
                    path,
                    io::Error::new(io::ErrorKind::InvalidData, "record decoded before header"),
                ));
            }
            Some(Err(e)) => return Err(PipelineError::read(path, e.into())),
            None => {
                return Err(PipelineError::read(
                    path,
                    io::Error::new(io::ErrorKind::UnexpectedEof, "decoder exited before header"),
                ));
            }
        }
        debug!("{}: header decoded, hint {:?}", path.display(), stream.hint);
        Ok(stream)
    }

    /// Context hint from the file header, if the file had one.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    fn recv(&self) -> Option<StreamItem> {
        self.rx.as_ref()?.recv().ok()
    }
}

impl Iterator for RecordStream {
    type Item = Result<Record, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.recv() {
                Some(Ok(StreamEvent::Record(record))) => {
                    self.yielded += 1;
                    return Some(Ok(record));
                }
                Some(Ok(StreamEvent::Hint(_))) => continue,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(PipelineError::ChunkRead {
                        path: self.path.clone(),
                        message: e.to_string(),
                    }));
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

impl Drop for RecordStream {
    fn drop(&mut self) {
        // Close the channel first so a decoder blocked on a full channel wakes up and exits.
        self.rx.take();
        if let Some(handle) = self.decoder.take() {
            let _ = handle.join();
        }
    }
}

impl fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStream")
            .field("path", &self.path)
            .field("hint", &self.hint)
            .field("yielded", &self.yielded)
            .field("done", &self.done)
            .finish()
    }
}

// ---- decoder thread ----

/// `(records_field, hint_field)`.
type Fields = (String, String);

fn decode_document(file: File, fields: Fields, tx: Sender<StreamItem>) {
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut de = serde_json::Deserializer::from_reader(reader);
    let result = DocumentVisitor {
        fields: &fields,
        tx: &tx,
    }
    .deserialize(&mut de)
    .and_then(|()| de.end());
    if let Err(e) = result {
        // Fails only when the consumer is gone, and then nobody is listening anyway.
        let _ = tx.send(Err(e));
    }
}

fn send<E: de::Error>(tx: &Sender<StreamItem>, event: StreamEvent) -> Result<(), E> {
    tx.send(Ok(event))
        .map_err(|_| E::custom("record stream closed by consumer"))
}

fn forward_records<'de, A: SeqAccess<'de>>(
    mut seq: A,
    tx: &Sender<StreamItem>,
) -> Result<(), A::Error> {
    while let Some(record) = seq.next_element::<Record>()? {
        send::<A::Error>(tx, StreamEvent::Record(record))?;
    }
    Ok(())
}

/// Top level: a bare record array, or an object holding the hint and the record array.
struct DocumentVisitor<'a> {
    fields: &'a Fields,
    tx: &'a Sender<StreamItem>,
}

impl<'de> DeserializeSeed<'de> for DocumentVisitor<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for DocumentVisitor<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of records or an object holding one")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<(), A::Error> {
        send::<A::Error>(self.tx, StreamEvent::Hint(None))?;
        forward_records(seq, self.tx)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let (records_field, hint_field) = self.fields;
        let mut hint_sent = false;
        while let Some(key) = map.next_key::<String>()? {
            if !hint_sent && key == *hint_field {
                let value: serde_json::Value = map.next_value()?;
                send::<A::Error>(self.tx, StreamEvent::Hint(value.as_str().map(str::to_owned)))?;
                hint_sent = true;
            } else if key == *records_field {
                if !hint_sent {
                    send::<A::Error>(self.tx, StreamEvent::Hint(None))?;
                    hint_sent = true;
                }
                map.next_value_seed(RecordArray { tx: self.tx })?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        if !hint_sent {
            send::<A::Error>(self.tx, StreamEvent::Hint(None))?;
        }
        Ok(())
    }
}

/// The value under `records_field`: an array of records, or null for none.
struct RecordArray<'a> {
    tx: &'a Sender<StreamItem>,
}

impl<'de> DeserializeSeed<'de> for RecordArray<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for RecordArray<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of records")
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        Ok(())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<(), A::Error> {
        forward_records(seq, self.tx)
    }
}
