use crate::core::session::Session;
use crate::core::table::Table;
use crate::core::table::Value;
use crate::error::Error;
use crate::error::Hint;
use crate::error::LastError;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

/// Which side of the exchange a file sits on, from the simulator's view:
/// `Input` files are produced by the host and consumed by the testbench,
/// `Output` files are produced by the testbench.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Direction {
    Input,
    Output,
}

/// Serialization layout of an exchange file.
///
/// `Control` files carry a timestamp in column 0, which therefore must stay
/// purely real.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Kind {
    Data,
    Control,
}

/// A named file handle exchanged with the external simulator.
///
/// Every field is always present; a descriptor starts out as `Output` and is
/// promoted to `Input` the moment data is written through it.
#[derive(Debug, PartialEq, Clone)]
pub struct FileDescriptor {
    name: String,
    path: PathBuf,
    direction: Direction,
    kind: Kind,
    payload: Table,
    sim_param: String,
    include_header: bool,
    preserve: bool,
}

impl FileDescriptor {
    fn new(name: &str, sim_path: &PathBuf, direction: Direction, kind: Kind, preserve: bool) -> Self {
        // the randomized suffix keeps repeated runs from colliding on disk
        let path = sim_path.join(format!(
            "{}_{}.txt",
            name,
            uuid::Uuid::new_v4().simple()
        ));
        let sim_param = format!("-g {}={}", name, path.display());
        Self {
            name: name.to_string(),
            path,
            direction,
            kind,
            payload: Table::new(),
            sim_param,
            include_header: true,
            preserve,
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_path(&self) -> &PathBuf {
        &self.path
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn get_kind(&self) -> Kind {
        self.kind
    }

    pub fn get_payload(&self) -> &Table {
        &self.payload
    }

    /// The pre-rendered `-g <name>=<path>` fragment binding this file into
    /// the testbench's parameter space.
    pub fn get_sim_param(&self) -> &str {
        &self.sim_param
    }

    pub fn get_preserve(&self) -> bool {
        self.preserve
    }

    pub fn set_preserve(&mut self, preserve: bool) {
        self.preserve = preserve;
    }

    pub fn get_include_header(&self) -> bool {
        self.include_header
    }

    /// Toggles the header row. Without a header, complex columns cannot be
    /// reassembled on read; every cell comes back as a real value.
    pub fn set_include_header(&mut self, include_header: bool) {
        self.include_header = include_header;
    }

    /// Renders the table as tab-separated text, splitting any column holding
    /// a complex value into adjacent `_Real`/`_Imag` columns.
    fn serialize(&self, table: &Table) -> Result<String, Error> {
        if self.kind == Kind::Control && table.get_num_cols() > 0 {
            if let Some(row) = table.first_complex_in_column(0) {
                return Err(Error::ComplexTimestamp(self.name.clone(), row));
            }
        }
        let complex_cols: Vec<bool> = (0..table.get_num_cols())
            .map(|c| table.column_is_complex(c))
            .collect();
        let mut text = String::new();
        if self.include_header == true {
            let mut labels = Vec::new();
            for (c, is_complex) in complex_cols.iter().enumerate() {
                if *is_complex == true {
                    labels.push(format!("{}_{}_Real", self.name, c));
                    labels.push(format!("{}_{}_Imag", self.name, c));
                } else {
                    labels.push(format!("{}_{}", self.name, c));
                }
            }
            text += &labels.join("\t");
            text += "\n";
        }
        for row in table.get_rows() {
            let mut cells = Vec::new();
            for (c, value) in row.iter().enumerate() {
                if complex_cols[c] == true {
                    cells.push(format!("{}", value.re()));
                    cells.push(format!("{}", value.im()));
                } else {
                    cells.push(format!("{}", value.re()));
                }
            }
            text += &cells.join("\t");
            text += "\n";
        }
        Ok(text)
    }

    /// Parses the descriptor's file back into a table.
    ///
    /// With a header row, adjacent `<base>_Real`/`<base>_Imag` labels are
    /// folded back into a single complex column.
    fn deserialize(&self, text: &str) -> Result<Table, Error> {
        let mut lines = text.lines();
        let layout: Option<Vec<bool>> = if self.include_header == true {
            match lines.next() {
                Some(header) => {
                    let labels: Vec<&str> = header.split('\t').collect();
                    let mut cols = Vec::new();
                    let mut i = 0;
                    while i < labels.len() {
                        let pair = match labels[i].strip_suffix("_Real") {
                            Some(base) => {
                                let imag = format!("{}_Imag", base);
                                labels.get(i + 1).map(|s| *s == imag).unwrap_or(false)
                            }
                            None => false,
                        };
                        if pair == true {
                            cols.push(true);
                            i += 2;
                        } else {
                            cols.push(false);
                            i += 1;
                        }
                    }
                    Some(cols)
                }
                None => None,
            }
        } else {
            None
        };
        let mut rows = Vec::new();
        for line in lines {
            if line.is_empty() == true {
                continue;
            }
            let cells: Vec<&str> = line.split('\t').collect();
            let mut row = Vec::new();
            match &layout {
                Some(cols) => {
                    let mut i = 0;
                    for is_complex in cols {
                        if *is_complex == true {
                            let re = self.parse_cell(cells.get(i))?;
                            let im = self.parse_cell(cells.get(i + 1))?;
                            row.push(Value::Complex(re, im));
                            i += 2;
                        } else {
                            row.push(Value::Real(self.parse_cell(cells.get(i))?));
                            i += 1;
                        }
                    }
                    if i != cells.len() {
                        return Err(Error::ColumnCountMismatch(self.path.clone()));
                    }
                }
                None => {
                    for cell in &cells {
                        row.push(Value::Real(self.parse_cell(Some(cell))?));
                    }
                }
            }
            rows.push(row);
        }
        Table::from_rows(rows)
    }

    fn parse_cell(&self, cell: Option<&&str>) -> Result<f64, Error> {
        let cell = match cell {
            Some(c) => *c,
            None => return Err(Error::ColumnCountMismatch(self.path.clone())),
        };
        match Value::from_str(cell) {
            Ok(v) => Ok(v.re()),
            Err(e) => Err(Error::MalformedCell(
                cell.to_string(),
                self.path.clone(),
                LastError(e.to_string()),
            )),
        }
    }
}

/// The session-scoped collection of exchange file descriptors.
///
/// Keys are the symbolic descriptor names; iteration order is the key order,
/// which keeps command assembly deterministic.
#[derive(Debug, PartialEq)]
pub struct Registry {
    inner: BTreeMap<String, FileDescriptor>,
    sim_path: PathBuf,
}

impl Registry {
    pub fn new(session: &Session) -> Self {
        Self {
            inner: BTreeMap::new(),
            sim_path: session.get_sim_path().clone(),
        }
    }

    /// Adds a fresh descriptor under `name`.
    pub fn register(
        &mut self,
        name: &str,
        direction: Direction,
        kind: Kind,
        preserve: bool,
    ) -> Result<&mut FileDescriptor, Error> {
        if self.inner.contains_key(name) == true {
            return Err(Error::DescriptorExists(name.to_string()));
        }
        let desc = FileDescriptor::new(name, &self.sim_path, direction, kind, preserve);
        Ok(self.inner.entry(name.to_string()).or_insert(desc))
    }

    pub fn get(&self, name: &str) -> Option<&FileDescriptor> {
        self.inner.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FileDescriptor> {
        self.inner.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.inner.values()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Serializes `table` to the named descriptor's file.
    ///
    /// The file is flushed and synced before returning so the external
    /// process can never observe a half-written file. As a side effect the
    /// descriptor's direction flips to `Input`.
    pub fn write(&mut self, name: &str, table: Table) -> Result<(), Error> {
        let desc = match self.inner.get_mut(name) {
            Some(d) => d,
            None => {
                return Err(Error::DescriptorNotFound(
                    name.to_string(),
                    Hint::RegisterFirst,
                ))
            }
        };
        // validate before touching the filesystem
        let text = desc.serialize(&table)?;
        let save = |path: &PathBuf, text: &str| -> Result<(), std::io::Error> {
            let mut file = std::fs::File::create(path)?;
            file.write_all(text.as_bytes())?;
            file.flush()?;
            file.sync_all()
        };
        match save(&desc.path, &text) {
            Ok(()) => {
                desc.payload = table;
                desc.direction = Direction::Input;
                Ok(())
            }
            Err(e) => Err(Error::ExchangeFileNotSaved(
                desc.path.clone(),
                LastError(e.to_string()),
            )),
        }
    }

    /// Reads the named descriptor's file back into its payload.
    pub fn read(&mut self, name: &str) -> Result<Table, Error> {
        let desc = match self.inner.get_mut(name) {
            Some(d) => d,
            None => {
                return Err(Error::DescriptorNotFound(
                    name.to_string(),
                    Hint::RegisterFirst,
                ))
            }
        };
        let text = match std::fs::read_to_string(&desc.path) {
            Ok(t) => t,
            Err(_) => return Err(Error::ExchangeFileMissing(desc.path.clone())),
        };
        let table = desc.deserialize(&text)?;
        desc.payload = table.clone();
        Ok(table)
    }

    /// Deletes every non-preserved descriptor's file and clears the registry.
    ///
    /// Deletion is best-effort: a file that never materialized is skipped
    /// silently.
    pub fn teardown(&mut self) {
        for desc in self.inner.values() {
            if desc.preserve == true {
                println!("info: preserving exchange file {:?}", desc.path);
            } else {
                let _ = std::fs::remove_file(&desc.path);
            }
        }
        self.inner.clear();
    }
}
