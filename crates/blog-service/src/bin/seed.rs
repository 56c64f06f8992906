use blog_service::{repositories::Repositories, settings};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let settings = settings::load_settings()?;
    let database_url = settings
        .database_url
        .clone()
        .ok_or("DATABASE_URL must be set")?;
    let db = blog_service::setup_database(&database_url).await?;
    let repositories = Repositories::postgres(db);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => seed::seed_data(&repositories, &settings).await?,
        ["remove-user", username] => {
            let removed = repositories.users.delete_user(username).await?;
            println!("Removed {} user(s) named {}", removed, username);
        }
        ["remove-group", slug] => {
            let removed = repositories.groups.delete_group(slug).await?;
            println!("Removed {} group(s) with slug {}", removed, slug);
        }
        _ => return Err("usage: seed [remove-user <username> | remove-group <slug>]".into()),
    }

    Ok(())
}

mod seed {
    use blog_service::{
        models::{
            comments::NewComment,
            groups::NewGroup,
            posts::{NewPost, PostFilter},
            users::{NewUser, User},
        },
        repositories::Repositories,
        settings::Settings,
    };
    use fake::{
        faker::{
            internet::en::{SafeEmail, Username},
            lorem::en::{Paragraph, Sentence, Word},
            name::en::{FirstName, LastName},
        },
        Fake, Faker,
    };

    pub async fn seed_data(
        repositories: &Repositories,
        settings: &Settings,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Check if data already exists
        let post_count = repositories.posts.count_posts(&PostFilter::All).await?;
        if post_count > 0 {
            println!("Data already exists, skipping seed");
            return Ok(());
        }

        let users = seed_users(repositories, settings, 10).await?;
        let group_ids = seed_groups(repositories, 5).await?;
        let post_ids = seed_posts(repositories, &users, &group_ids, 40).await?;
        seed_comments(repositories, &users, &post_ids, 60).await?;
        seed_follows(repositories, &users, 15).await?;

        println!("Seed data inserted successfully");
        Ok(())
    }

    async fn seed_users(
        repositories: &Repositories,
        settings: &Settings,
        count: usize,
    ) -> Result<Vec<User>, Box<dyn std::error::Error>> {
        let mut users = Vec::new();
        let ttl = chrono::Duration::hours(settings.session_ttl_hours);

        for i in 0..count {
            let username: String = Username().fake();
            let user = repositories
                .users
                .create_user(NewUser {
                    username: format!("{}{}", username, i),
                    first_name: FirstName().fake(),
                    last_name: LastName().fake(),
                    email: SafeEmail().fake(),
                })
                .await?;

            let session = repositories.users.create_session(user.id, ttl).await?;
            println!("{}: Bearer {}", user.username, session.token);

            users.push(user);
        }

        Ok(users)
    }

    async fn seed_groups(
        repositories: &Repositories,
        count: usize,
    ) -> Result<Vec<i64>, Box<dyn std::error::Error>> {
        let mut group_ids = Vec::new();

        for i in 0..count {
            let word: String = Word().fake();
            let group = repositories
                .groups
                .create_group(NewGroup {
                    title: Sentence(1..4).fake(),
                    slug: format!("{}-{}", word.to_lowercase(), i),
                    description: Paragraph(1..3).fake(),
                })
                .await?;

            group_ids.push(group.id);
        }

        Ok(group_ids)
    }

    async fn seed_posts(
        repositories: &Repositories,
        users: &[User],
        group_ids: &[i64],
        count: usize,
    ) -> Result<Vec<i64>, Box<dyn std::error::Error>> {
        let mut post_ids = Vec::new();

        for _ in 0..count {
            let author = &users[Faker.fake::<usize>() % users.len()];
            // Roughly a third of the posts stay outside any group.
            let group_id = match Faker.fake::<usize>() % 3 {
                0 => None,
                _ => Some(group_ids[Faker.fake::<usize>() % group_ids.len()]),
            };

            let post = repositories
                .posts
                .create_post(NewPost {
                    text: Paragraph(1..5).fake(),
                    author_id: author.id,
                    group_id,
                    image: None,
                })
                .await?;

            post_ids.push(post.id);
        }

        Ok(post_ids)
    }

    async fn seed_comments(
        repositories: &Repositories,
        users: &[User],
        post_ids: &[i64],
        count: usize,
    ) -> Result<(), Box<dyn std::error::Error>> {
        for _ in 0..count {
            let author = &users[Faker.fake::<usize>() % users.len()];
            let post_id = post_ids[Faker.fake::<usize>() % post_ids.len()];

            repositories
                .comments
                .create_comment(NewComment {
                    post_id,
                    author_id: author.id,
                    text: Sentence(3..12).fake(),
                })
                .await?;
        }

        Ok(())
    }

    async fn seed_follows(
        repositories: &Repositories,
        users: &[User],
        count: usize,
    ) -> Result<(), Box<dyn std::error::Error>> {
        for _ in 0..count {
            let user = &users[Faker.fake::<usize>() % users.len()];
            let author = &users[Faker.fake::<usize>() % users.len()];

            if user.id != author.id {
                repositories.follows.create_follow(user.id, author.id).await?;
            }
        }

        Ok(())
    }
}
