/// Admissions are identified by the UUID the remote service assigns.
pub type AdmissionId = uuid::Uuid;
