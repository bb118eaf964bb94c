use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceRecord {
    pub date: String,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub attendance: Vec<AttendanceRecord>,
    pub observations: Vec<String>,
}

/// One student slot parsed from an import file. Missing fields get
/// defaults when the roster is rebuilt (`Roster::replace_all`).
#[derive(Debug, Clone, Default)]
pub struct ImportedStudent {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    EmptyName,
    EmptyObservation,
    NotFound(i64),
    EmptyImport,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::EmptyName => "empty_name",
            StoreError::EmptyObservation => "empty_observation",
            StoreError::NotFound(_) => "not_found",
            StoreError::EmptyImport => "empty_import",
        }
    }

    pub fn message(&self) -> String {
        match self {
            StoreError::EmptyName => "name must not be empty".to_string(),
            StoreError::EmptyObservation => "observation must not be empty".to_string(),
            StoreError::NotFound(id) => format!("student {} not found", id),
            StoreError::EmptyImport => "no students found in the file".to_string(),
        }
    }
}

/// In-memory roster. Insertion order is display order; ids are unique and
/// stable for the lifetime of the session. There is no persistence: the
/// roster lives and dies with the process.
#[derive(Debug, Default)]
pub struct Roster {
    students: Vec<Student>,
    next_id: i64,
}

impl Roster {
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn student(&self, id: i64) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    fn student_mut(&mut self, id: i64) -> Result<&mut Student, StoreError> {
        self.students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn fresh_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_student(&mut self, name: &str) -> Result<&Student, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let id = self.fresh_id();
        self.students.push(Student {
            id,
            name: name.to_string(),
            attendance: Vec::new(),
            observations: Vec::new(),
        });
        Ok(self.students.last().expect("just pushed"))
    }

    /// Renames in place; id, roster position and nested data are untouched.
    pub fn edit_student(&mut self, id: i64, new_name: &str) -> Result<(), StoreError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let student = self.student_mut(id)?;
        student.name = new_name.to_string();
        Ok(())
    }

    /// Removes the student and everything nested under them.
    pub fn delete_student(&mut self, id: i64) -> Result<(), StoreError> {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        if self.students.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Upsert keyed on the exact date string: an existing record for that
    /// date is overwritten in place (position preserved), otherwise a new
    /// record is appended. At most one record per date ever exists.
    pub fn mark_attendance(
        &mut self,
        id: i64,
        date: &str,
        present: bool,
    ) -> Result<(), StoreError> {
        let student = self.student_mut(id)?;
        match student.attendance.iter_mut().find(|r| r.date == date) {
            Some(record) => record.present = present,
            None => student.attendance.push(AttendanceRecord {
                date: date.to_string(),
                present,
            }),
        }
        Ok(())
    }

    pub fn add_observation(&mut self, id: i64, text: &str) -> Result<(), StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyObservation);
        }
        let student = self.student_mut(id)?;
        student.observations.push(text.to_string());
        Ok(())
    }

    /// Full-roster replace, never a merge: all existing students and their
    /// history are discarded. An empty row set is rejected and leaves the
    /// roster untouched. Imported students always start with empty
    /// attendance and observations.
    pub fn replace_all(&mut self, rows: Vec<ImportedStudent>) -> Result<usize, StoreError> {
        if rows.is_empty() {
            return Err(StoreError::EmptyImport);
        }
        // Fresh ids must clear every id the file brings in, so scan first.
        for row in &rows {
            if let Some(id) = row.id {
                self.next_id = self.next_id.max(id);
            }
        }
        let mut students = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            let id = match row.id {
                Some(id) => id,
                None => self.fresh_id(),
            };
            let name = match row.name {
                Some(n) if !n.trim().is_empty() => n.trim().to_string(),
                _ => format!("Élève {}", index + 1),
            };
            students.push(Student {
                id,
                name,
                attendance: Vec::new(),
                observations: Vec::new(),
            });
        }
        let imported = students.len();
        self.students = students;
        Ok(imported)
    }
}
