//! Built-in community post categories.
//!
//! Adding a generic category means adding one entry to [`builtin_post_types`];
//! categories with purpose-built screens go in [`BESPOKE_CREATE_ROUTES`].

use crate::domain::{
    fields::{FieldSpec, SelectOption},
    post_types::PostTypeConfig,
    rules,
};

/// Categories served by their own screens, with their create routes.
pub const BESPOKE_CREATE_ROUTES: &[(&str, &str)] = &[
    ("prayer-request", "/community/prayer/new"),
    ("church-event", "/community/events/new"),
    ("photo-album", "/community/albums/upload"),
    ("used-market", "/community/market/sell"),
];

const TITLE_MAX: usize = 100;
const BODY_MAX: usize = 2000;

fn options(pairs: &[(&str, &str)]) -> Vec<SelectOption> {
    pairs
        .iter()
        .map(|(value, label)| SelectOption::new(*value, *label))
        .collect()
}

fn title() -> FieldSpec {
    FieldSpec::text("title", "Title")
        .required()
        .max_length(TITLE_MAX)
        .placeholder("A short headline")
}

fn contact_phone() -> FieldSpec {
    FieldSpec::tel("contact_phone", "Contact phone")
        .max_length(20)
        .placeholder("010-0000-0000")
        .validate(rules::phone)
}

fn contact_email() -> FieldSpec {
    FieldSpec::email("contact_email", "Contact email")
        .max_length(120)
        .validate(rules::email)
}

fn instruments() -> Vec<SelectOption> {
    options(&[
        ("vocal", "Vocal"),
        ("piano", "Piano / Keyboard"),
        ("guitar", "Guitar"),
        ("bass", "Bass"),
        ("drums", "Drums"),
        ("strings", "Strings"),
        ("winds", "Winds"),
        ("sound", "Sound engineering"),
        ("other", "Other"),
    ])
}

pub fn builtin_post_types() -> Vec<PostTypeConfig> {
    vec![
        PostTypeConfig::new("free-sharing", "Free sharing")
            .success_message("Your free-sharing post is up. Thank you for giving!")
            .field(title())
            .field(FieldSpec::select(
                "category",
                "Category",
                options(&[
                    ("furniture", "Furniture"),
                    ("appliances", "Appliances"),
                    ("clothing", "Clothing"),
                    ("books", "Books"),
                    ("kids", "Kids & baby"),
                    ("other", "Other"),
                ]),
            ))
            .field(FieldSpec::select(
                "condition",
                "Condition",
                options(&[("new", "New"), ("like-new", "Like new"), ("used", "Used")]),
            ))
            .field(
                FieldSpec::textarea("description", "Description")
                    .required()
                    .max_length(BODY_MAX),
            )
            .field(FieldSpec::text("location", "Pickup location").max_length(100))
            .field(contact_phone())
            .field(FieldSpec::images("images", "Photos").required()),
        PostTypeConfig::new("item-request", "Item request")
            .success_message("Your request has been posted.")
            .field(title())
            .field(FieldSpec::select(
                "category",
                "Category",
                options(&[
                    ("furniture", "Furniture"),
                    ("appliances", "Appliances"),
                    ("clothing", "Clothing"),
                    ("books", "Books"),
                    ("kids", "Kids & baby"),
                    ("other", "Other"),
                ]),
            ))
            .field(
                FieldSpec::textarea("description", "What do you need?")
                    .required()
                    .max_length(BODY_MAX),
            )
            .field(FieldSpec::date("needed_by", "Needed by").validate(rules::calendar_date))
            .field(contact_phone())
            .field(FieldSpec::images("images", "Reference photos")),
        PostTypeConfig::new("sharing-offer", "Sharing offer")
            .success_message("Your offer has been shared with the community.")
            .field(title())
            .field(
                FieldSpec::textarea("description", "What are you offering?")
                    .required()
                    .max_length(BODY_MAX),
            )
            .field(
                FieldSpec::date("available_until", "Available until")
                    .validate(rules::calendar_date),
            )
            .field(FieldSpec::time("pickup_time", "Pickup time").validate(rules::clock_time))
            .field(FieldSpec::text("location", "Pickup location").max_length(100))
            .field(contact_phone())
            .field(FieldSpec::images("images", "Photos")),
        PostTypeConfig::new("job-posting", "Job posting")
            .success_message("Your job posting is live.")
            .field(title())
            .field(
                FieldSpec::text("company_name", "Company")
                    .required()
                    .max_length(100),
            )
            .field(FieldSpec::select(
                "employment_type",
                "Employment type",
                options(&[
                    ("full-time", "Full-time"),
                    ("part-time", "Part-time"),
                    ("contract", "Contract"),
                    ("internship", "Internship"),
                ]),
            ))
            .field(FieldSpec::text("salary", "Salary").max_length(50))
            .field(FieldSpec::text("location", "Work location").max_length(100))
            .field(
                FieldSpec::textarea("description", "Job description")
                    .required()
                    .max_length(BODY_MAX),
            )
            .field(FieldSpec::date("deadline", "Application deadline").validate(rules::calendar_date))
            .field(contact_email())
            .field(contact_phone())
            .field(FieldSpec::images("images", "Images")),
        PostTypeConfig::new("job-seeking", "Job seeking")
            .success_message("Your profile has been posted. We are praying with you!")
            .field(title())
            .field(
                FieldSpec::text("desired_field", "Desired field")
                    .required()
                    .max_length(100),
            )
            .field(
                FieldSpec::number("experience_years", "Years of experience")
                    .validate(rules::non_negative_integer),
            )
            .field(
                FieldSpec::textarea("introduction", "Introduction")
                    .required()
                    .max_length(BODY_MAX),
            )
            .field(contact_email())
            .field(contact_phone()),
        PostTypeConfig::new("music-team-recruit", "Music team recruiting")
            .success_message("Your recruiting post is up.")
            .field(title())
            .field(FieldSpec::text("team_name", "Team").required().max_length(60))
            .field(FieldSpec::select("instrument", "Position", instruments()))
            .field(FieldSpec::select(
                "rehearsal_day",
                "Rehearsal day",
                options(&[
                    ("sunday", "Sunday"),
                    ("saturday", "Saturday"),
                    ("wednesday", "Wednesday"),
                    ("friday", "Friday"),
                    ("other", "Other"),
                ]),
            ))
            .field(FieldSpec::time("rehearsal_time", "Rehearsal time").validate(rules::clock_time))
            .field(
                FieldSpec::textarea("description", "Details")
                    .required()
                    .max_length(BODY_MAX),
            )
            .field(contact_phone().required()),
        PostTypeConfig::new("music-team-seeking", "Music team seeking")
            .success_message("Your post is up. A team will reach out soon.")
            .field(title())
            .field(FieldSpec::select("instrument", "Position", instruments()))
            .field(
                FieldSpec::number("experience_years", "Years of experience")
                    .validate(rules::non_negative_integer),
            )
            .field(
                FieldSpec::textarea("introduction", "Introduction")
                    .required()
                    .max_length(BODY_MAX),
            )
            .field(contact_email())
            .field(contact_phone().required()),
    ]
}
