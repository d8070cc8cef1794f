//! `pebs` traces parsing.
//!
//! The sampler emits a flat sequence of packed 29-byte little-endian
//! records, with no magic or header.

// Imports
use {
	anyhow::Context,
	byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt},
	std::{fmt, io},
};

/// Pebs trace reader
#[derive(Clone, Debug)]
pub struct TraceReader<R> {
	/// Records remaining
	records_remaining: u64,

	/// Reader
	reader: R,
}

impl<R: io::Read + io::Seek> TraceReader<R> {
	/// Creates a trace reader from a reader.
	///
	/// The record count is derived from the stream length. Trailing bytes
	/// that don't form a whole record are ignored, not treated as corruption.
	pub fn from_reader(mut reader: R) -> Result<Self, anyhow::Error> {
		let stream_len = reader
			.seek(io::SeekFrom::End(0))
			.context("Unable to get stream length")?;
		reader.rewind().context("Unable to rewind reader")?;

		let record_size = Record::BYTE_SIZE as u64;
		let total_records = stream_len / record_size;
		if stream_len % record_size != 0 {
			tracing::warn!(
				"Trace size {stream_len} isn't a multiple of the record size {record_size}, ignoring trailing bytes"
			);
		}

		Ok(Self {
			records_remaining: total_records,
			reader,
		})
	}

	/// Reads the next record
	pub fn read_next(&mut self) -> Result<Option<Record>, anyhow::Error> {
		// If we're done, return `None`
		if self.records_remaining == 0 {
			return Ok(None);
		}

		// Else parse the next record and reduce the remaining records
		let record = Record::from_reader(&mut self.reader).context("Unable to read record")?;
		self.records_remaining -= 1;

		Ok(Some(record))
	}

	/// Returns the remaining records
	pub fn records_remaining(&self) -> u64 {
		self.records_remaining
	}
}

/// Pebs trace writer
#[derive(Clone, Debug)]
pub struct TraceWriter<W> {
	/// Records written
	records_written: u64,

	/// Writer
	writer: W,
}

impl<W: io::Write> TraceWriter<W> {
	/// Creates a new writer
	pub fn new(writer: W) -> Self {
		Self {
			records_written: 0,
			writer,
		}
	}

	/// Writes a record
	pub fn write(&mut self, record: &Record) -> Result<(), anyhow::Error> {
		record.to_writer(&mut self.writer).context("Unable to write record")?;

		self.records_written += 1;
		Ok(())
	}

	/// Returns the records written so far
	pub fn records_written(&self) -> u64 {
		self.records_written
	}

	/// Finishes writing, returning the inner writer
	pub fn finish(self) -> W {
		self.writer
	}
}

/// Record
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Record {
	/// Cycle counter at sample time
	pub cycle: u64,

	/// Sampled virtual address
	pub addr: u64,

	/// Instruction pointer of the sampled access
	pub ip: u64,

	/// Cpu the sample was taken on
	pub cpu: u32,

	/// Access kind
	pub kind: RecordKind,
}

impl Record {
	/// Returns the size of this record
	pub const BYTE_SIZE: usize = 29;

	/// Parses a record from a reader
	pub fn from_reader<R: io::Read>(reader: &mut R) -> Result<Self, anyhow::Error> {
		let cycle = reader.read_u64::<LittleEndian>().context("Unable to read cycle")?;
		let addr = reader.read_u64::<LittleEndian>().context("Unable to read address")?;
		let ip = reader
			.read_u64::<LittleEndian>()
			.context("Unable to read instruction pointer")?;
		let cpu = reader.read_u32::<LittleEndian>().context("Unable to read cpu")?;
		let kind = match reader.read_u8().context("Unable to read access kind")? {
			0 => RecordKind::DramRead,
			1 => RecordKind::NvmRead,
			2 => RecordKind::Write,
			kind => anyhow::bail!("Unknown access kind: {kind}"),
		};

		Ok(Self {
			cycle,
			addr,
			ip,
			cpu,
			kind,
		})
	}

	/// Writes a record to a writer
	pub fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<(), anyhow::Error> {
		writer
			.write_u64::<LittleEndian>(self.cycle)
			.context("Unable to write cycle")?;
		writer
			.write_u64::<LittleEndian>(self.addr)
			.context("Unable to write address")?;
		writer
			.write_u64::<LittleEndian>(self.ip)
			.context("Unable to write instruction pointer")?;
		writer
			.write_u32::<LittleEndian>(self.cpu)
			.context("Unable to write cpu")?;

		let kind_encoded = match self.kind {
			RecordKind::DramRead => 0,
			RecordKind::NvmRead => 1,
			RecordKind::Write => 2,
		};
		writer.write_u8(kind_encoded).context("Unable to write access kind")?;

		Ok(())
	}
}

/// Record access kind
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum RecordKind {
	/// Sampled dram read
	DramRead,

	/// Sampled nvm read
	NvmRead,

	/// Write
	Write,
}

/// Trace
///
/// Owned sequence of records, ascending by cycle.
#[derive(Clone, Debug)]
pub struct Trace {
	/// Records, ascending by cycle
	records: Vec<Record>,
}

impl Trace {
	/// Reads all records from `reader` and sorts them by cycle
	pub fn from_reader<R: io::Read + io::Seek>(reader: R) -> Result<Self, anyhow::Error> {
		let mut trace_reader = TraceReader::from_reader(reader)?;

		let mut records = Vec::with_capacity(trace_reader.records_remaining() as usize);
		while let Some(record) = trace_reader
			.read_next()
			.with_context(|| format!("Unable to read record {}", records.len()))?
		{
			records.push(record);
		}

		Ok(Self::from_records(records))
	}

	/// Creates a trace from records, sorting them by cycle
	pub fn from_records(mut records: Vec<Record>) -> Self {
		records.sort_by_key(|record| record.cycle);
		Self { records }
	}

	/// Returns all records
	pub fn records(&self) -> &[Record] {
		&self.records
	}

	/// Returns the number of records
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns if the trace has no records
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}

/// Role of a trace in an evaluation
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TraceRole {
	/// Observed accesses
	Observed,

	/// Predicted accesses
	Predicted,
}

impl fmt::Display for TraceRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Observed => f.pad("observed"),
			Self::Predicted => f.pad("predicted"),
		}
	}
}

#[cfg(test)]
mod test {
	use {super::*, std::io::Cursor};

	/// Creates a record with `cycle` and `addr`
	fn record(cycle: u64, addr: u64) -> Record {
		Record {
			cycle,
			addr,
			ip: 0xdead_beef,
			cpu: 3,
			kind: RecordKind::DramRead,
		}
	}

	#[test]
	fn round_trip() {
		let records = vec![
			record(0, 0x1000),
			Record {
				cycle: 5,
				addr:  0x2000,
				ip:    0x4010_0000,
				cpu:   17,
				kind:  RecordKind::Write,
			},
			Record {
				cycle: 9,
				addr:  0x3000,
				ip:    0,
				cpu:   0,
				kind:  RecordKind::NvmRead,
			},
		];

		let mut writer = TraceWriter::new(Cursor::new(Vec::new()));
		for record in &records {
			writer.write(record).expect("Unable to write record");
		}
		assert_eq!(writer.records_written(), 3);

		let buf = writer.finish().into_inner();
		assert_eq!(buf.len(), 3 * Record::BYTE_SIZE);

		let mut reader = TraceReader::from_reader(Cursor::new(buf)).expect("Unable to create reader");
		assert_eq!(reader.records_remaining(), 3);
		for record in &records {
			assert_eq!(reader.read_next().expect("Unable to read record"), Some(*record));
		}
		assert_eq!(reader.read_next().expect("Unable to read record"), None);
	}

	#[test]
	fn trailing_partial_record_is_ignored() {
		let mut writer = TraceWriter::new(Cursor::new(Vec::new()));
		writer.write(&record(0, 0x1000)).expect("Unable to write record");

		// Append half a record worth of garbage
		let mut buf = writer.finish().into_inner();
		buf.extend_from_slice(&[0xab; Record::BYTE_SIZE / 2]);

		let trace = Trace::from_reader(Cursor::new(buf)).expect("Unable to read trace");
		assert_eq!(trace.len(), 1);
		assert_eq!(trace.records()[0], record(0, 0x1000));
	}

	#[test]
	fn unknown_access_kind() {
		let mut buf = Vec::new();
		record(0, 0x1000)
			.to_writer(&mut buf)
			.expect("Unable to write record");
		*buf.last_mut().expect("Buffer was empty") = 0x7f;

		assert!(Trace::from_reader(Cursor::new(buf)).is_err());
	}

	#[test]
	fn from_records_sorts_by_cycle() {
		let trace = Trace::from_records(vec![record(9, 0x3000), record(0, 0x1000), record(5, 0x2000)]);

		let cycles = trace.records().iter().map(|record| record.cycle).collect::<Vec<_>>();
		assert_eq!(cycles, [0, 5, 9]);
	}

	#[test]
	fn empty_trace() {
		let trace = Trace::from_reader(Cursor::new(Vec::new())).expect("Unable to read trace");
		assert!(trace.is_empty());
	}
}
