/// Column list shared by every user read.
macro_rules! user_columns {
    () => {
        "id,name,email,password_hash,account_role,phone,address,is_enabled,created_at,updated_at"
    };
}

/// Veterinarian joined with its account and the clinics it is assigned to.
macro_rules! veterinarian_profile_select {
    () => {
        r#"
SELECT
    v.id,v.user_id,v.license_number,v.specializations,v.years_of_experience,
    v.consultation_fee,v.availability,v.rating,v.review_count,v.is_available,
    v.created_at,v.updated_at,
    u.name,u.email,u.phone,
    (SELECT group_concat(cv.clinic_id) FROM clinic_veterinarian AS cv
     WHERE cv.veterinarian_id = v.id) AS clinic_ids
FROM veterinarian AS v
INNER JOIN user_app AS u ON (u.id = v.user_id)
"#
    };
}

macro_rules! clinic_select {
    () => {
        r#"
SELECT
    c.id,c.name,c.description,c.address,c.contact,c.services,c.operating_hours,
    c.pricing,c.features,c.rating,c.is_active,c.is_emergency_24h,c.created_at,c.updated_at,
    (SELECT group_concat(cv.veterinarian_id) FROM clinic_veterinarian AS cv
     WHERE cv.clinic_id = c.id) AS veterinarian_ids
FROM clinic AS c
"#
    };
}

/// Appointment joined with customer, vet, pet and clinic display fields.
macro_rules! appointment_details_select {
    () => {
        r#"
SELECT
    a.id,a.pet_id,a.clinic_id,a.veterinarian_id,a.customer_id,
    a.appointment_date,a.end_time,a.status,a.appointment_type,a.reason,
    a.diagnosis,a.treatment,a.notes,a.amount,a.payment_status,
    a.created_at,a.updated_at,
    vu.name AS veterinarian_name,
    v.specializations AS veterinarian_specializations,
    p.name AS pet_name,
    p.species AS pet_species,
    c.name AS clinic_name,
    cu.name AS customer_name,
    cu.email AS customer_email
FROM appointment AS a
INNER JOIN user_app AS cu ON (cu.id = a.customer_id)
LEFT JOIN veterinarian AS v ON (v.id = a.veterinarian_id)
LEFT JOIN user_app AS vu ON (vu.id = v.user_id)
LEFT JOIN pet AS p ON (p.id = a.pet_id)
LEFT JOIN clinic AS c ON (c.id = a.clinic_id)
"#
    };
}

/// Appointments assigned to vet `$1` or to a clinic where vet `$1` works.
macro_rules! vet_scope {
    () => {
        "(a.veterinarian_id = $1 OR a.clinic_id IN (SELECT cv.clinic_id FROM clinic_veterinarian AS cv WHERE cv.veterinarian_id = $1))"
    };
}

pub const QUERY_GET_USER_BY_ID: &str =
    concat!("SELECT ", user_columns!(), " FROM user_app WHERE id=$1;");

pub const QUERY_GET_USER_BY_EMAIL: &str = concat!(
    "SELECT ",
    user_columns!(),
    " FROM user_app WHERE email=$1 COLLATE NOCASE;"
);

pub const QUERY_GET_ALL_USERS: &str =
    concat!("SELECT ", user_columns!(), " FROM user_app ORDER BY created_at DESC;");

pub const QUERY_INSERT_USER: &str = r#"
INSERT INTO user_app(
    name,email,password_hash,account_role,phone,address,is_enabled,created_at,updated_at
) VALUES($1,$2,$3,$4,$5,$6,$7,$8,$9)
ON CONFLICT DO NOTHING
RETURNING id;
"#;

pub const QUERY_GET_STORED_ROLES: &str =
    "SELECT id AS user_id, account_role AS raw_role FROM user_app ORDER BY id;";

pub const QUERY_INSERT_PET: &str = r#"
INSERT INTO pet (
    owner_id,name,species,breed,age,gender,weight,color,allergies,notes,
    created_at,updated_at
) VALUES($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12);
"#;

pub const QUERY_UPDATE_PET: &str = r#"
UPDATE pet SET
    name=$2,species=$3,breed=$4,age=$5,gender=$6,weight=$7,color=$8,
    allergies=$9,notes=$10,updated_at=$11
WHERE id=$1;
"#;

pub const QUERY_GET_PET_BY_ID: &str = r#"
SELECT id,owner_id,name,species,breed,age,gender,weight,color,allergies,notes,created_at,updated_at
FROM pet WHERE id=$1;
"#;

pub const QUERY_GET_PETS_BY_OWNER: &str = r#"
SELECT id,owner_id,name,species,breed,age,gender,weight,color,allergies,notes,created_at,updated_at
FROM pet WHERE owner_id=$1
ORDER BY name;
"#;

pub const QUERY_INSERT_MEDICAL_RECORD: &str = r#"
INSERT INTO pet_medical_record (
    pet_id,record_date,description,diagnosis,treatment,veterinarian_id,created_at
) VALUES($1,$2,$3,$4,$5,$6,$7);
"#;

pub const QUERY_GET_MEDICAL_RECORDS: &str = r#"
SELECT id,pet_id,record_date,description,diagnosis,treatment,veterinarian_id,created_at
FROM pet_medical_record
WHERE pet_id=$1
ORDER BY record_date DESC;
"#;

pub const QUERY_INSERT_VACCINATION: &str = r#"
INSERT INTO pet_vaccination (
    pet_id,name,date_administered,next_due_date,created_at
) VALUES($1,$2,$3,$4,$5);
"#;

pub const QUERY_GET_VACCINATIONS: &str = r#"
SELECT id,pet_id,name,date_administered,next_due_date,created_at
FROM pet_vaccination
WHERE pet_id=$1
ORDER BY date_administered DESC;
"#;

pub const QUERY_INSERT_VETERINARIAN: &str = r#"
INSERT INTO veterinarian (
    user_id,license_number,specializations,years_of_experience,consultation_fee,
    availability,rating,review_count,is_available,created_at,updated_at
) VALUES($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
ON CONFLICT DO NOTHING
RETURNING id;
"#;

pub const QUERY_UPDATE_VETERINARIAN: &str = r#"
UPDATE veterinarian SET
    license_number=$2,specializations=$3,years_of_experience=$4,consultation_fee=$5,
    availability=$6,is_available=$7,updated_at=$8
WHERE id=$1;
"#;

pub const QUERY_GET_VETERINARIAN_BY_ID: &str = r#"
SELECT id,user_id,license_number,specializations,years_of_experience,consultation_fee,
    availability,rating,review_count,is_available,created_at,updated_at
FROM veterinarian WHERE id=$1;
"#;

pub const QUERY_GET_VETERINARIAN_BY_USER_ID: &str = r#"
SELECT id,user_id,license_number,specializations,years_of_experience,consultation_fee,
    availability,rating,review_count,is_available,created_at,updated_at
FROM veterinarian WHERE user_id=$1;
"#;

pub const QUERY_GET_VETERINARIAN_PROFILE: &str =
    concat!(veterinarian_profile_select!(), "WHERE v.id = $1;");

pub const QUERY_GET_VETERINARIAN_PROFILES: &str = concat!(
    veterinarian_profile_select!(),
    "WHERE ($1 = 0 OR v.is_available = 1) ORDER BY v.rating DESC, u.name;"
);

pub const QUERY_GET_VETERINARIAN_CLINIC_IDS: &str = r#"
SELECT clinic_id FROM clinic_veterinarian WHERE veterinarian_id=$1 ORDER BY created_at, clinic_id;
"#;

pub const QUERY_INSERT_CLINIC: &str = r#"
INSERT INTO clinic (
    name,description,address,contact,services,operating_hours,pricing,features,
    rating,is_active,is_emergency_24h,created_at,updated_at
) VALUES($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13);
"#;

pub const QUERY_GET_CLINIC_BY_ID: &str = concat!(clinic_select!(), "WHERE c.id = $1;");

pub const QUERY_GET_CLINICS: &str = concat!(
    clinic_select!(),
    "WHERE ($1 = 0 OR c.is_active = 1) ORDER BY c.rating DESC, c.name;"
);

pub const QUERY_ASSIGN_VETERINARIAN_TO_CLINIC: &str = r#"
INSERT INTO clinic_veterinarian (clinic_id,veterinarian_id,created_at)
VALUES($1,$2,$3)
ON CONFLICT DO NOTHING;
"#;

pub const QUERY_INSERT_APPOINTMENT: &str = r#"
INSERT INTO appointment (
    pet_id,clinic_id,veterinarian_id,customer_id,appointment_date,end_time,
    status,appointment_type,reason,diagnosis,treatment,notes,amount,payment_status,
    created_at,updated_at
) VALUES($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16)
ON CONFLICT DO NOTHING
RETURNING id;
"#;

pub const QUERY_UPDATE_APPOINTMENT: &str = r#"
UPDATE appointment SET
    pet_id=$2,clinic_id=$3,veterinarian_id=$4,appointment_date=$5,end_time=$6,
    status=$7,appointment_type=$8,reason=$9,diagnosis=$10,treatment=$11,notes=$12,
    amount=$13,payment_status=$14,updated_at=$15
WHERE id=$1 AND status=$16;
"#;

pub const QUERY_TRANSITION_APPOINTMENT_STATUS: &str = r#"
UPDATE appointment SET status=$3, updated_at=$4 WHERE id=$1 AND status=$2;
"#;

pub const QUERY_GET_APPOINTMENT_BY_ID: &str = r#"
SELECT
    id,pet_id,clinic_id,veterinarian_id,customer_id,appointment_date,end_time,
    status,appointment_type,reason,diagnosis,treatment,notes,amount,payment_status,
    created_at,updated_at
FROM appointment WHERE id=$1;
"#;

pub const QUERY_GET_APPOINTMENT_DETAILS: &str =
    concat!(appointment_details_select!(), "WHERE a.id = $1;");

pub const QUERY_FIND_APPOINTMENTS: &str = concat!(
    appointment_details_select!(),
    r#"
WHERE
    ($1 IS NULL OR a.customer_id = $1)
    AND ($2 IS NULL OR a.veterinarian_id = $2)
    AND ($3 IS NULL OR a.veterinarian_id = $3 OR a.clinic_id IN (
        SELECT cv.clinic_id FROM clinic_veterinarian AS cv WHERE cv.veterinarian_id = $3
    ))
    AND ($4 IS NULL OR a.status = $4)
    AND ($5 IS NULL OR a.appointment_date >= $5)
    AND ($6 IS NULL OR a.appointment_date < $6)
ORDER BY a.appointment_date DESC
LIMIT $7;
"#
);

pub const QUERY_GET_BOOKED_SLOTS: &str = r#"
SELECT a.id AS appointment_id,a.veterinarian_id,a.appointment_date,a.status
FROM appointment AS a
WHERE
    a.appointment_date >= $1
    AND a.appointment_date < $2
    AND a.status IN ('scheduled', 'confirmed')
    AND ($3 IS NULL OR a.veterinarian_id = $3)
ORDER BY a.appointment_date;
"#;

pub const QUERY_GET_ADMIN_COUNTS: &str = r#"
SELECT
    (SELECT COUNT(*) FROM user_app) AS total_users,
    (SELECT COUNT(*) FROM veterinarian) AS total_veterinarians,
    (SELECT COUNT(*) FROM clinic) AS total_clinics,
    (SELECT COUNT(*) FROM pet) AS total_pets,
    (SELECT COUNT(*) FROM appointment) AS total_appointments,
    (SELECT COUNT(*) FROM appointment
     WHERE appointment_date >= $1 AND appointment_date < $2) AS todays_appointments,
    (SELECT COUNT(*) FROM appointment WHERE status = 'scheduled') AS scheduled_appointments,
    (SELECT COUNT(*) FROM appointment WHERE status = 'completed') AS completed_appointments;
"#;

pub const QUERY_GET_VET_COUNTS: &str = concat!(
    "SELECT (SELECT COUNT(*) FROM appointment AS a WHERE ",
    vet_scope!(),
    " AND a.appointment_date >= $2 AND a.appointment_date < $3) AS todays_appointments,",
    " (SELECT COUNT(*) FROM appointment AS a WHERE ",
    vet_scope!(),
    " AND a.appointment_date >= $2 AND a.status IN ('scheduled', 'confirmed')) AS upcoming_appointments,",
    " (SELECT COUNT(*) FROM appointment AS a WHERE ",
    vet_scope!(),
    " AND a.status = 'completed') AS completed_appointments,",
    " (SELECT COUNT(DISTINCT a.pet_id) FROM appointment AS a WHERE ",
    vet_scope!(),
    " AND a.pet_id IS NOT NULL) AS total_patients;"
);

pub const QUERY_GET_VET_PATIENTS: &str = concat!(
    r#"
SELECT
    p.id AS pet_id,p.name AS pet_name,p.species,p.breed,
    u.id AS owner_id,u.name AS owner_name,u.email AS owner_email,
    COUNT(a.id) AS visit_count,
    MAX(a.appointment_date) AS last_visit
FROM appointment AS a
INNER JOIN pet AS p ON (p.id = a.pet_id)
INNER JOIN user_app AS u ON (u.id = p.owner_id)
WHERE "#,
    vet_scope!(),
    r#"
GROUP BY p.id,p.name,p.species,p.breed,u.id,u.name,u.email
ORDER BY last_visit DESC;
"#
);
